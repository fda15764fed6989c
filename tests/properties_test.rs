#[cfg(test)]
mod tests {
    use runit_events::constants::{DEFAULT_CITY, DEFAULT_NAME, DEFAULT_START_DATE};
    use runit_events::pipeline::aggregate;
    use runit_events::{geo, EventNormalizer, FilterState, Registration, UrlPolicy};
    use serde_json::{json, Value};
    use std::collections::HashMap;

    const CITIES: [&str; 4] = ["Bruxelles", "Namur", "Liège", "Spa"];
    const LINKS: [Option<&str>; 6] = [
        Some("/book/1"),
        None,
        Some(""),
        Some("https://register.finishers.com/x"),
        Some("https://www.finishers.com/course/y"),
        Some("https://elsewhere.example/z"),
    ];
    const DATES: [Option<&str>; 6] = [
        Some("2024-05-01"),
        Some("2024-03-17T09:00:00.000Z"),
        None,
        Some("2023-12-31"),
        Some("pas encore"),
        Some("2024-05-01T06:00:00+02:00"),
    ];

    /// Deterministic spread of documents covering every link and date shape
    fn corpus(n: usize) -> Vec<Value> {
        (0..n)
            .map(|i| {
                let mut doc = json!({ "eventName": format!("course {i}") });
                if let Some(date) = DATES[i % DATES.len()] {
                    doc["editionStartDate"] = json!(date);
                }
                if i % 7 != 3 {
                    doc["city"] = json!(CITIES[(i / 2) % CITIES.len()]);
                }
                if i % 5 != 0 {
                    let lat = 50.0 + (i % 3) as f64 / 10.0;
                    doc["coordinates"] = json!([lat, 4.5]);
                }
                if let Some(link) = LINKS[i % LINKS.len()] {
                    doc["Links"] = json!({ "registration": link });
                }
                doc
            })
            .collect()
    }

    fn pages() -> Vec<Vec<Value>> {
        let docs = corpus(60);
        vec![docs[..30].to_vec(), docs[30..].to_vec()]
    }

    #[test]
    fn test_normalizer_is_total_for_every_missing_field() {
        let full = json!({
            "eventName": "Semi de Namur",
            "editionStartDate": "2024-05-01",
            "city": "Namur",
            "coordinates": [50.46, 4.86],
            "Links": { "registration": "/book/1" }
        });
        let normalizer = EventNormalizer::default();

        for field in ["eventName", "editionStartDate", "city", "coordinates", "Links"] {
            let mut doc = full.clone();
            doc.as_object_mut().unwrap().remove(field);
            let event = normalizer.normalize(&doc);

            assert_eq!(event.name == DEFAULT_NAME, field == "eventName");
            assert_eq!(event.start_date == DEFAULT_START_DATE, field == "editionStartDate");
            assert_eq!(event.venue.city == DEFAULT_CITY, field == "city");
            assert_eq!(event.latitude == 0.0, field == "coordinates");
            assert_eq!(
                matches!(event.registration, Registration::Informational(_)),
                field == "Links"
            );
        }
    }

    #[test]
    fn test_resolved_urls_are_never_relative() {
        let normalizer = EventNormalizer::new(UrlPolicy::default());
        for doc in corpus(60) {
            let event = normalizer.normalize(&doc);
            assert!(
                event.registration_url().starts_with("https://"),
                "relative url {}",
                event.registration_url()
            );
        }
    }

    #[test]
    fn test_sort_is_non_decreasing_for_dated_events() {
        let events = aggregate(&pages(), &UrlPolicy::default());
        let stamps: Vec<Option<i64>> = events
            .iter()
            .map(|e| e.starts_at().map(|d| d.timestamp()))
            .collect();

        let first_undated = stamps.iter().position(Option::is_none).unwrap_or(stamps.len());
        assert!(stamps[first_undated..].iter().all(Option::is_none));
        let dated: Vec<i64> = stamps[..first_undated].iter().flatten().copied().collect();
        assert!(dated.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_filter_composition_is_monotone() {
        let events = aggregate(&pages(), &UrlPolicy::default());
        let view = |reservable: bool, region: Option<&str>| -> Vec<String> {
            runit_events::filter::filter(
                &events,
                &FilterState::new(reservable, region.map(String::from)),
            )
            .iter()
            .map(|e| e.fingerprint())
            .collect()
        };
        let subset = |small: &[String], big: &[String]| small.iter().all(|x| big.contains(x));

        let all = view(false, None);
        assert_eq!(all.len(), events.len());
        let bookable = view(true, None);
        assert!(subset(&bookable, &all));

        for city in CITIES {
            let both = view(true, Some(city));
            let by_city = view(false, Some(city));
            assert!(subset(&both, &bookable));
            assert!(subset(&both, &by_city));
            assert!(subset(&by_city, &all));
        }
    }

    #[test]
    fn test_grouping_partitions_the_aggregate() {
        let events = aggregate(&pages(), &UrlPolicy::default());
        let groups = geo::group(&events);

        let total: usize = groups.iter().map(|g| g.events.len()).sum();
        assert_eq!(total, events.len());

        // Keys are pairwise distinct and every member carries its group's key
        let mut keys = HashMap::new();
        for (i, g) in groups.iter().enumerate() {
            assert!(keys.insert(g.coordinates.key(), i).is_none());
            assert!(g.events.iter().all(|e| e.coordinates().key() == g.coordinates.key()));
        }

        // Members keep aggregate order
        for g in &groups {
            let expected: Vec<_> = events
                .iter()
                .filter(|e| e.coordinates().key() == g.coordinates.key())
                .cloned()
                .collect();
            assert_eq!(g.events, expected);
        }
    }
}
