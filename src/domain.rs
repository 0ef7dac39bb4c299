use std::collections::{HashMap, HashSet};

use chrono::{Duration as ChronoDuration, NaiveDate};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::calendar::format_date;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default)]
    pub dates: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_per_day: Option<u32>,
}

/// Root of the data file. Activities keep the order they appear in.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivitiesData {
    #[serde(default, with = "ordered_map")]
    pub activities: Vec<(String, Activity)>,
}

mod ordered_map {
    use std::{fmt, marker::PhantomData};

    use serde::{
        Deserialize, Deserializer, Serialize, Serializer,
        de::{MapAccess, Visitor},
        ser::SerializeMap,
    };

    pub fn serialize<S, V>(entries: &[(String, V)], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        V: Serialize,
    {
        let mut map = serializer.serialize_map(Some(entries.len()))?;
        for (key, value) in entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }

    pub fn deserialize<'de, D, V>(deserializer: D) -> Result<Vec<(String, V)>, D::Error>
    where
        D: Deserializer<'de>,
        V: Deserialize<'de>,
    {
        struct EntriesVisitor<V>(PhantomData<V>);

        impl<'de, V: Deserialize<'de>> Visitor<'de> for EntriesVisitor<V> {
            type Value = Vec<(String, V)>;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of activity keys to activities")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries: Vec<(String, V)> =
                    Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((key, value)) = access.next_entry::<String, V>()? {
                    // Later duplicates replace earlier ones in place.
                    if let Some(slot) = entries.iter_mut().find(|(k, _)| *k == key) {
                        slot.1 = value;
                    } else {
                        entries.push((key, value));
                    }
                }
                Ok(entries)
            }
        }

        deserializer.deserialize_map(EntriesVisitor(PhantomData))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProcessedActivity {
    pub name: String,
    pub color: Option<String>,
    pub target_per_day: u32,
    pub date_set: HashSet<String>,
    pub date_counts: HashMap<String, usize>,
    /// Length of the raw date list. Duplicate entries are counted, so this
    /// can exceed `date_set.len()`.
    pub total_count: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProcessedActivities {
    entries: Vec<(String, ProcessedActivity)>,
}

impl ProcessedActivities {
    pub fn get(&self, key: &str) -> Option<&ProcessedActivity> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, a)| a)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ProcessedActivity)> {
        self.entries.iter().map(|(k, a)| (k.as_str(), a))
    }

    pub fn by_index(&self, index: usize) -> Option<(&str, &ProcessedActivity)> {
        self.entries.get(index).map(|(k, a)| (k.as_str(), a))
    }

    pub fn all(&self) -> Vec<&ProcessedActivity> {
        self.entries.iter().map(|(_, a)| a).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub fn process(raw: &ActivitiesData) -> ProcessedActivities {
    let entries = raw
        .activities
        .iter()
        .map(|(key, activity)| (key.clone(), ProcessedActivity::from_raw(activity)))
        .collect();
    ProcessedActivities { entries }
}

/// 1 when the activity happened on `date_key`, else 0.
pub fn level_for_single(date_key: &str, activity: &ProcessedActivity) -> u8 {
    if activity.date_set.contains(date_key) {
        1
    } else {
        0
    }
}

/// How many of `activities` happened on `date_key`, capped at level 3.
pub fn level_for_aggregate(date_key: &str, activities: &[&ProcessedActivity]) -> u8 {
    let count = activities
        .iter()
        .filter(|activity| activity.date_set.contains(date_key))
        .count();

    match count {
        0 => 0,
        1 => 1,
        2 => 2,
        _ => 3,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Completion {
    None,
    Low,
    Partial,
    Complete,
}

impl Completion {
    pub fn level(self) -> u8 {
        match self {
            Completion::None => 0,
            Completion::Low => 1,
            Completion::Partial => 2,
            Completion::Complete => 3,
        }
    }
}

pub fn completion_for(date_key: &str, activity: &ProcessedActivity) -> Completion {
    let completions = activity.date_counts.get(date_key).copied().unwrap_or(0);
    if completions == 0 {
        return Completion::None;
    }

    let rate = completions as f64 / activity.target_per_day as f64;
    if rate < 0.5 {
        Completion::Low
    } else if rate < 1.0 {
        Completion::Partial
    } else {
        Completion::Complete
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ActivityStats {
    pub total_entries: usize,
    pub unique_days: usize,
    pub current_streak: usize,
    pub target_per_day: u32,
    pub completion_rate: Option<f64>,
}

impl ProcessedActivity {
    pub fn from_raw(activity: &Activity) -> Self {
        let date_counts: HashMap<String, usize> = activity.dates.iter().cloned().counts();
        let date_set = date_counts.keys().cloned().collect();

        Self {
            name: activity.name.clone(),
            color: activity.color.clone(),
            target_per_day: activity.target_per_day.filter(|t| *t > 0).unwrap_or(1),
            date_set,
            date_counts,
            total_count: activity.dates.len(),
        }
    }

    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        self.date_set.contains(&format_date(date))
    }

    /// Consecutive active days ending at `today`; zero when `today` itself
    /// has no entry.
    pub fn current_streak(&self, today: NaiveDate) -> usize {
        let mut streak = 0;
        let mut day = today;
        while self.is_active_on(day) {
            streak += 1;
            day -= ChronoDuration::days(1);
        }
        streak
    }

    pub fn stats(&self, today: NaiveDate) -> ActivityStats {
        let unique_days = self.date_set.len();
        let expected = unique_days * self.target_per_day as usize;
        let completion_rate = (self.target_per_day > 1 && expected > 0)
            .then(|| self.total_count as f64 / expected as f64 * 100.0);

        ActivityStats {
            total_entries: self.total_count,
            unique_days,
            current_streak: self.current_streak(today),
            target_per_day: self.target_per_day,
            completion_rate,
        }
    }

    /// Dates with more entries than the daily target, oldest first.
    pub fn over_target_days(&self) -> Vec<(&str, usize)> {
        self.date_counts
            .iter()
            .filter(|(_, count)| **count > self.target_per_day as usize)
            .map(|(date, count)| (date.as_str(), *count))
            .sorted()
            .collect()
    }
}
