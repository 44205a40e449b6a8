//! Friends directory entries and birthday ordering.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::types::FriendId;

/// An entry in the friends directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Friend {
    pub id: FriendId,
    pub name: String,
    pub surname: String,
    pub email: String,
    pub birth_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// The anniversary of `birth_date` in `year`.
///
/// Feb 29 birthdays fall back to Mar 1 in non-leap years.
fn birthday_in_year(birth_date: NaiveDate, year: i32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, birth_date.month(), birth_date.day())
        .unwrap_or_else(|| NaiveDate::from_ymd_opt(year, 3, 1).expect("March 1 always exists"))
}

/// The next occurrence of the birthday on or after `today`.
pub fn next_birthday(birth_date: NaiveDate, today: NaiveDate) -> NaiveDate {
    let this_year = birthday_in_year(birth_date, today.year());
    if this_year < today {
        birthday_in_year(birth_date, today.year() + 1)
    } else {
        this_year
    }
}

/// Days from `today` until the next birthday. Zero when the birthday is today.
pub fn days_until_birthday(birth_date: NaiveDate, today: NaiveDate) -> i64 {
    (next_birthday(birth_date, today) - today).num_days()
}

/// Sorts the directory by soonest upcoming birthday.
///
/// The sort is stable: friends sharing a birthday keep their relative order.
pub fn sort_by_upcoming_birthday(friends: &mut [Friend], today: NaiveDate) {
    friends.sort_by_key(|friend| next_birthday(friend.birth_date, today));
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn friend(name: &str, birth_date: NaiveDate) -> Friend {
        let now = Utc::now();
        Friend {
            id: FriendId::new(format!("f-{name}")).unwrap(),
            name: name.to_string(),
            surname: "Test".to_string(),
            email: format!("{name}@example.com"),
            birth_date,
            description: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn birthday_later_this_year_stays_in_current_year() {
        let today = date(2025, 3, 10);
        assert_eq!(next_birthday(date(1990, 8, 2), today), date(2025, 8, 2));
    }

    #[test]
    fn birthday_already_past_rolls_to_next_year() {
        let today = date(2025, 9, 1);
        assert_eq!(next_birthday(date(1990, 8, 2), today), date(2026, 8, 2));
    }

    #[test]
    fn birthday_today_counts_as_zero_days() {
        let today = date(2025, 8, 2);
        assert_eq!(days_until_birthday(date(1990, 8, 2), today), 0);
    }

    #[test]
    fn leap_day_falls_back_to_march_first() {
        let today = date(2025, 1, 15);
        assert_eq!(next_birthday(date(1996, 2, 29), today), date(2025, 3, 1));
        // In a leap year the real date is used.
        let today = date(2028, 1, 15);
        assert_eq!(next_birthday(date(1996, 2, 29), today), date(2028, 2, 29));
    }

    #[test]
    fn sort_orders_by_soonest_birthday() {
        let today = date(2025, 6, 15);
        let mut friends = vec![
            friend("december", date(1985, 12, 25)),
            friend("july", date(1992, 7, 1)),
            friend("may", date(1970, 5, 30)), // already past, next year
        ];
        sort_by_upcoming_birthday(&mut friends, today);

        let names: Vec<&str> = friends.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["july", "december", "may"]);
    }

    #[test]
    fn friend_json_uses_camel_case_fields() {
        let json = serde_json::to_value(friend("ana", date(1990, 8, 2))).unwrap();
        assert!(json.get("birthDate").is_some());
        assert!(json.get("createdAt").is_some());
        assert!(json.get("description").is_none());
    }
}
