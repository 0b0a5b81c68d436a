use chrono::NaiveDate;

use super::EntityKind;

/// Date format embedded in extract file names
const FILE_DATE_FORMAT: &str = "%d%m%Y";

/// Source identifiers of the three extracts for one run date,
/// e.g. `customers_18102026.csv`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceNames {
    pub customers: String,
    pub orders: String,
    pub items: String,
}

impl SourceNames {
    pub fn for_date(date: NaiveDate, prefix: &str) -> Self {
        let stamp = date.format(FILE_DATE_FORMAT).to_string();
        let name = |kind: EntityKind| {
            let file = format!("{}_{}.csv", kind.as_str(), stamp);
            let prefix = prefix.trim_end_matches('/');
            if prefix.is_empty() {
                file
            } else {
                format!("{}/{}", prefix, file)
            }
        };

        Self {
            customers: name(EntityKind::Customers),
            orders: name(EntityKind::Orders),
            items: name(EntityKind::Items),
        }
    }
}

/// Accepts `DDMMYYYY` (as in the file names) or ISO `YYYY-MM-DD`.
pub fn parse_run_date(raw: &str) -> Result<NaiveDate, String> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, FILE_DATE_FORMAT))
        .map_err(|_| format!("invalid run date '{}': expected DDMMYYYY or YYYY-MM-DD", raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_for_date() {
        let date = NaiveDate::from_ymd_opt(2023, 3, 7).unwrap();
        let names = SourceNames::for_date(date, "");

        assert_eq!(names.customers, "customers_07032023.csv");
        assert_eq!(names.orders, "orders_07032023.csv");
        assert_eq!(names.items, "items_07032023.csv");
    }

    #[test]
    fn test_names_with_prefix() {
        let date = NaiveDate::from_ymd_opt(2023, 12, 25).unwrap();
        let names = SourceNames::for_date(date, "daily/");

        assert_eq!(names.items, "daily/items_25122023.csv");
    }

    #[test]
    fn test_parse_run_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2023, 3, 7).unwrap();
        assert_eq!(parse_run_date("07032023"), Ok(expected));
        assert_eq!(parse_run_date("2023-03-07"), Ok(expected));
        assert!(parse_run_date("7/3/2023").is_err());
        assert!(parse_run_date("32132023").is_err());
    }
}
