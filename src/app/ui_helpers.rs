pub fn wrap_prev_index(current: usize, len: usize) -> usize {
    if len == 0 {
        0
    } else if current == 0 {
        len - 1
    } else {
        current - 1
    }
}

pub fn wrap_next_index(current: usize, len: usize) -> usize {
    if len == 0 || current + 1 >= len {
        0
    } else {
        current + 1
    }
}

/// Moves `(week, day)` by the given deltas, staying inside `weeks` x 7.
pub fn step_cell(
    (week, day): (usize, usize),
    week_delta: isize,
    day_delta: isize,
    weeks: usize,
) -> Option<(usize, usize)> {
    let week = week.checked_add_signed(week_delta)?;
    let day = day.checked_add_signed(day_delta)?;
    (week < weeks && day < 7).then_some((week, day))
}

pub fn short_help(single: bool) -> &'static str {
    if single {
        "↑/↓ activity • ←/→ a/d week • w/s day • tab all • t timeline • ? help • q quit"
    } else {
        "tab/1-9 select • ↑/↓ scroll • t timeline • l legend • ? help • q quit"
    }
}

pub const FULL_HELP: [&str; 4] = [
    "tab  switch view        1-9  open activity     esc  back to all",
    "↑/k ↓/j  previous/next activity (scroll in overview)",
    "←/a →/d  move a week    w/s  move a day        home  jump to today",
    "t  cycle 3/6/12 months  l  toggle legend       ?  toggle help   q  quit",
];
