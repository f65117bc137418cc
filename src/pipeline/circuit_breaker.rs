//! Circuit Breaker for stored weeks.
//!
//! Upstream list files are occasionally served truncated, replaced by an
//! error page, or still hold last week's list under the new week's name.
//! Before a freshly annotated week is stored it is checked against the
//! previous stored week:
//!
//! - a list with no books is refused
//! - a list whose "week ended" date is not later than the previous week's
//!   is refused as stale
//! - every category that was large enough last week must keep enough of its
//!   books; a category that vanished counts as a full drop
//!
//! Only listed books count. Entries already marked dropped are ignored.

use chrono::NaiveDate;

use crate::error::{AppError, Result};
use crate::models::{BestsellerList, CircuitBreakerSettings};
use crate::utils::parse_list_date;

/// Circuit breaker for preventing bad list updates.
#[derive(Debug, Clone)]
pub struct CircuitBreaker {
    config: CircuitBreakerSettings,
}

/// A category that lost more books than allowed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryShrink {
    pub name: String,
    pub previous_count: usize,
    /// Zero when the category is missing from the new list
    pub current_count: usize,
}

impl CategoryShrink {
    pub fn drop_percent(&self) -> f64 {
        let lost = self.previous_count.saturating_sub(self.current_count);
        lost as f64 / self.previous_count.max(1) as f64 * 100.0
    }
}

/// Result of circuit breaker check.
#[derive(Debug, Clone, PartialEq)]
pub enum CircuitBreakerResult {
    /// Safe to proceed with the write
    Safe { books: usize, categories: usize },
    /// Nothing stored for the previous week to compare against
    ColdStart { books: usize },
    /// Parsed list holds no books at all
    NoBooks,
    /// List date is not later than the previous stored week's
    StaleWeek {
        current: NaiveDate,
        previous: NaiveDate,
    },
    /// One or more categories shrank past the threshold
    Shrunk(Vec<CategoryShrink>),
}

impl CircuitBreaker {
    pub fn new() -> Self {
        Self::with_config(CircuitBreakerSettings::default())
    }

    pub fn with_config(config: CircuitBreakerSettings) -> Self {
        Self { config }
    }

    /// Check if it's safe to store `current` given the previous week.
    pub fn check(
        &self,
        current: &BestsellerList,
        previous: Option<&BestsellerList>,
    ) -> CircuitBreakerResult {
        let books = current.book_count();
        let previous = previous.filter(|p| p.book_count() > 0);

        if books == 0 {
            return match previous {
                None if self.config.allow_cold_start => CircuitBreakerResult::ColdStart { books },
                _ => CircuitBreakerResult::NoBooks,
            };
        }

        let Some(previous) = previous else {
            return CircuitBreakerResult::ColdStart { books };
        };

        if let (Some(current_date), Some(previous_date)) =
            (parse_list_date(&current.date), parse_list_date(&previous.date))
        {
            if current_date <= previous_date {
                return CircuitBreakerResult::StaleWeek {
                    current: current_date,
                    previous: previous_date,
                };
            }
        }

        let shrunk = self.shrunk_categories(current, previous);
        if !shrunk.is_empty() {
            return CircuitBreakerResult::Shrunk(shrunk);
        }

        CircuitBreakerResult::Safe {
            books,
            categories: current.categories.len(),
        }
    }

    fn shrunk_categories(
        &self,
        current: &BestsellerList,
        previous: &BestsellerList,
    ) -> Vec<CategoryShrink> {
        previous
            .categories
            .iter()
            .filter_map(|prev| {
                let previous_count = prev.listed_books().count();
                if previous_count < self.config.min_category_books {
                    return None;
                }
                let current_count = current
                    .category(&prev.name)
                    .map_or(0, |c| c.listed_books().count());
                let shrink = CategoryShrink {
                    name: prev.name.clone(),
                    previous_count,
                    current_count,
                };
                (shrink.drop_percent() > f64::from(self.config.max_drop_percent))
                    .then_some(shrink)
            })
            .collect()
    }

    /// Validate and return Ok if safe, Err if circuit breaker triggered.
    pub fn validate(
        &self,
        current: &BestsellerList,
        previous: Option<&BestsellerList>,
    ) -> Result<()> {
        match self.check(current, previous) {
            CircuitBreakerResult::Safe { books, categories } => {
                log::info!(
                    "Circuit breaker: SAFE ({} books in {} categories)",
                    books,
                    categories
                );
                Ok(())
            }
            CircuitBreakerResult::ColdStart { books } => {
                log::info!("Circuit breaker: COLD START ({} books, no previous week)", books);
                Ok(())
            }
            CircuitBreakerResult::NoBooks => {
                log::error!("Circuit breaker: NO BOOKS parsed - aborting write");
                Err(AppError::CircuitBreaker("parsed list has no books".into()))
            }
            CircuitBreakerResult::StaleWeek { current, previous } => {
                log::error!(
                    "Circuit breaker: STALE list dated {} (previous week dated {})",
                    current,
                    previous
                );
                Err(AppError::CircuitBreaker(format!(
                    "list dated {current} is not newer than {previous}"
                )))
            }
            CircuitBreakerResult::Shrunk(shrunk) => {
                let details: Vec<String> = shrunk
                    .iter()
                    .map(|s| {
                        format!(
                            "{} {} → {} ({:.0}%)",
                            s.name,
                            s.previous_count,
                            s.current_count,
                            s.drop_percent()
                        )
                    })
                    .collect();
                log::error!(
                    "Circuit breaker: TRIGGERED! {} (> {}% threshold)",
                    details.join(", "),
                    self.config.max_drop_percent
                );
                Err(AppError::CircuitBreaker(details.join(", ")))
            }
        }
    }
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Book, Category};

    fn category(name: &str, count: usize) -> Category {
        Category {
            name: name.to_string(),
            books: (1..=count)
                .map(|rank| {
                    Book::new(
                        rank as u32,
                        format!("{name} {rank}"),
                        "Author",
                        "Publisher",
                        "",
                        "",
                    )
                })
                .collect(),
        }
    }

    fn week(date: &str, categories: Vec<Category>) -> BestsellerList {
        BestsellerList {
            date: date.to_string(),
            categories,
            ..BestsellerList::default()
        }
    }

    fn last_week() -> BestsellerList {
        week(
            "Sunday, March 3, 2024",
            vec![category("Hardcover Fiction", 15), category("Paperback Fiction", 15)],
        )
    }

    #[test]
    fn test_regular_week_is_safe() {
        let current = week(
            "Sunday, March 10, 2024",
            vec![category("Hardcover Fiction", 15), category("Paperback Fiction", 14)],
        );
        assert_eq!(
            CircuitBreaker::new().check(&current, Some(&last_week())),
            CircuitBreakerResult::Safe {
                books: 29,
                categories: 2
            }
        );
    }

    #[test]
    fn test_vanished_category_trips_even_when_total_holds() {
        let current = week(
            "Sunday, March 10, 2024",
            vec![category("Hardcover Fiction", 30)],
        );
        let result = CircuitBreaker::new().check(&current, Some(&last_week()));

        assert_eq!(
            result,
            CircuitBreakerResult::Shrunk(vec![CategoryShrink {
                name: "Paperback Fiction".into(),
                previous_count: 15,
                current_count: 0,
            }])
        );
    }

    #[test]
    fn test_truncated_category_trips() {
        let current = week(
            "Sunday, March 10, 2024",
            vec![category("Hardcover Fiction", 15), category("Paperback Fiction", 4)],
        );
        let CircuitBreakerResult::Shrunk(shrunk) =
            CircuitBreaker::new().check(&current, Some(&last_week()))
        else {
            panic!("expected a shrunk category");
        };
        assert_eq!(shrunk.len(), 1);
        assert_eq!(shrunk[0].name, "Paperback Fiction");
        assert!(shrunk[0].drop_percent() > 70.0);
    }

    #[test]
    fn test_small_categories_are_not_guarded() {
        let previous = week(
            "Sunday, March 3, 2024",
            vec![category("Hardcover Fiction", 15), category("Poetry", 3)],
        );
        let current = week(
            "Sunday, March 10, 2024",
            vec![category("Hardcover Fiction", 15)],
        );
        assert!(matches!(
            CircuitBreaker::new().check(&current, Some(&previous)),
            CircuitBreakerResult::Safe { .. }
        ));
    }

    #[test]
    fn test_repeated_list_is_stale() {
        let current = week("Sunday, March 3, 2024", last_week().categories);
        assert_eq!(
            CircuitBreaker::new().check(&current, Some(&last_week())),
            CircuitBreakerResult::StaleWeek {
                current: NaiveDate::from_ymd_opt(2024, 3, 3).unwrap(),
                previous: NaiveDate::from_ymd_opt(2024, 3, 3).unwrap(),
            }
        );
    }

    #[test]
    fn test_unreadable_dates_skip_stale_check() {
        let mut previous = last_week();
        previous.date = "March 3".into();
        let current = week("", last_week().categories);
        assert!(matches!(
            CircuitBreaker::new().check(&current, Some(&previous)),
            CircuitBreakerResult::Safe { .. }
        ));
    }

    #[test]
    fn test_no_previous_week_is_cold_start() {
        let current = week("", vec![category("Hardcover Fiction", 2)]);
        assert_eq!(
            CircuitBreaker::new().check(&current, None),
            CircuitBreakerResult::ColdStart { books: 2 }
        );
    }

    #[test]
    fn test_empty_list_refused_against_history() {
        let cb = CircuitBreaker::new();
        let empty = week("Sunday, March 10, 2024", vec![category("Hardcover Fiction", 0)]);

        assert_eq!(cb.check(&empty, Some(&last_week())), CircuitBreakerResult::NoBooks);
        assert_eq!(cb.check(&empty, None), CircuitBreakerResult::ColdStart { books: 0 });

        let strict = CircuitBreaker::with_config(CircuitBreakerSettings {
            allow_cold_start: false,
            ..CircuitBreakerSettings::default()
        });
        assert_eq!(strict.check(&empty, None), CircuitBreakerResult::NoBooks);
    }

    #[test]
    fn test_dropped_entries_are_not_counted() {
        let mut current = week(
            "Sunday, March 10, 2024",
            vec![category("Hardcover Fiction", 15), category("Paperback Fiction", 15)],
        );
        for book in &mut current.categories[1].books[3..] {
            book.was_dropped = Some(true);
        }
        assert!(matches!(
            CircuitBreaker::new().check(&current, Some(&last_week())),
            CircuitBreakerResult::Shrunk(_)
        ));
    }

    #[test]
    fn test_validate_names_shrunk_category() {
        let current = week(
            "Sunday, March 10, 2024",
            vec![category("Hardcover Fiction", 15)],
        );
        let err = CircuitBreaker::new()
            .validate(&current, Some(&last_week()))
            .unwrap_err();

        assert!(matches!(err, AppError::CircuitBreaker(_)));
        assert!(err.to_string().contains("Paperback Fiction 15 → 0"));
    }
}
