//! Name search over current cabin state.

use crate::{Cabin, Ship};

/// True when `query` appears in the cabin's booking name or in any
/// passenger's first name, surname or "first surname".
///
/// Matching is a case-sensitive substring test, so an exact match is just the
/// longest possible substring. Empty cabins never match.
pub fn cabin_matches(cabin: &Cabin, query: &str) -> bool {
    let Some(name) = cabin.name() else {
        return false;
    };

    name.contains(query)
        || cabin.passengers().iter().any(|p| {
            p.first_name.contains(query) || p.surname.contains(query) || p.full_name().contains(query)
        })
}

/// Cabins whose booking or passengers match `query`, ascending by number.
///
/// The query is trimmed first. A blank query matches nothing; rejecting it
/// with a message is up to the request layer.
pub fn find_cabins_by_name(ship: &Ship, query: &str) -> Vec<Cabin> {
    let query = query.trim();
    if query.is_empty() {
        return Vec::new();
    }

    ship.cabins()
        .iter()
        .filter(|cabin| cabin_matches(cabin, query))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Passenger, PassengerType};

    fn ship() -> Ship {
        let mut ship = Ship::new();
        ship.assign_passengers(
            3,
            "Smith Family",
            vec![Passenger::new("Ann", "Smith", PassengerType::Adult)],
        )
        .unwrap();
        ship.assign_passengers(
            7,
            "Honeymoon",
            vec![
                Passenger::new("Rosa", "Diaz", PassengerType::Adult),
                Passenger::new("Carl", "Smithers", PassengerType::Adult),
            ],
        )
        .unwrap();
        ship.assign_passengers(
            1,
            "Lee Party",
            vec![Passenger::new("Kim", "Lee", PassengerType::Child)],
        )
        .unwrap();
        ship
    }

    fn numbers(cabins: &[Cabin]) -> Vec<u8> {
        cabins.iter().map(|c| c.number().get()).collect()
    }

    #[test]
    fn test_find_by_surname_returns_cabin() {
        let found = find_cabins_by_name(&ship(), "Smith");
        assert_eq!(numbers(&found), vec![3, 7]);
    }

    #[test]
    fn test_find_by_full_name() {
        assert_eq!(numbers(&find_cabins_by_name(&ship(), "Rosa Diaz")), vec![7]);
        assert_eq!(numbers(&find_cabins_by_name(&ship(), "a Di")), vec![7]);
    }

    #[test]
    fn test_find_by_booking_name() {
        assert_eq!(numbers(&find_cabins_by_name(&ship(), "Honeymoon")), vec![7]);
        assert_eq!(numbers(&find_cabins_by_name(&ship(), "Party")), vec![1]);
    }

    #[test]
    fn test_find_results_are_ascending() {
        // "a" hits Ann (3), Rosa (7) and "Lee Party" (1)
        assert_eq!(numbers(&find_cabins_by_name(&ship(), "a")), vec![1, 3, 7]);
    }

    #[test]
    fn test_no_match_is_empty_not_error() {
        assert!(find_cabins_by_name(&ship(), "Nobody").is_empty());
    }

    #[test]
    fn test_match_is_case_sensitive() {
        assert!(find_cabins_by_name(&ship(), "smith").is_empty());
    }

    #[test]
    fn test_blank_query_and_empty_cabins() {
        assert!(find_cabins_by_name(&ship(), "   ").is_empty());
        // The empty-cabin marker is not a booking name
        assert!(find_cabins_by_name(&Ship::new(), "e").is_empty());
    }
}
