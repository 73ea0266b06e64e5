use pcgs_scalar::models::*;
use serde_json::json;
use speculate2::speculate;

fn serials(collection: &ScalarCollection, level: ScalarLevel) -> Vec<String> {
    collection.serials(level)
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

speculate! {
    before {
        let mut collection = ScalarCollection::new();
    }

    describe "add_entry" {
        it "assigns the next position when order_index is unset" {
            collection.add_entry(ScalarEntry::new(ScalarLevel::Topic, "1.1", "Network"));
            collection.add_entry(ScalarEntry::new(ScalarLevel::Topic, "1.2", "Hosts"));
            collection.add_entry(ScalarEntry::new(ScalarLevel::Clo, "1", "Identify threats"));

            let topics = collection.get_by_level(ScalarLevel::Topic);
            assert_eq!(topics[0].order_index, 1);
            assert_eq!(topics[1].order_index, 2);
            assert_eq!(collection.get_by_level(ScalarLevel::Clo)[0].order_index, 1);
        }

        it "keeps an explicit order_index" {
            collection.add_entry(ScalarEntry::new(ScalarLevel::Lesson, "L1", "Intro").with_order_index(7));

            assert_eq!(collection.get_by_level(ScalarLevel::Lesson)[0].order_index, 7);
        }

        it "allows duplicate serials at the model level" {
            collection.add_entry(ScalarEntry::new(ScalarLevel::Clo, "1", "Identify threats"));
            collection.add_entry(ScalarEntry::new(ScalarLevel::Clo, "1", "Analyze logs"));

            assert_eq!(collection.count_by_level(ScalarLevel::Clo), 2);
        }
    }

    describe "get_by_level" {
        it "sorts by order_index and keeps insertion order on ties" {
            collection.add_entry(ScalarEntry::new(ScalarLevel::Subtopic, "b", "B").with_order_index(2));
            collection.add_entry(ScalarEntry::new(ScalarLevel::Subtopic, "a", "A").with_order_index(1));
            collection.add_entry(ScalarEntry::new(ScalarLevel::Subtopic, "c", "C").with_order_index(2));

            assert_eq!(serials(&collection, ScalarLevel::Subtopic), strings(&["a", "b", "c"]));
        }

        it "returns nothing for an empty level" {
            assert!(collection.get_by_level(ScalarLevel::PerformanceCriteria).is_empty());
        }
    }

    describe "counts" {
        it "reports every level including empty ones" {
            collection.add_entry(ScalarEntry::new(ScalarLevel::Clo, "1", "Identify threats"));
            collection.add_entry(ScalarEntry::new(ScalarLevel::Lesson, "1", "Intro"));
            collection.add_entry(ScalarEntry::new(ScalarLevel::Lesson, "2", "Review"));

            let counts = collection.get_counts();
            assert_eq!(counts.len(), 5);
            assert_eq!(counts[&ScalarLevel::Clo], 1);
            assert_eq!(counts[&ScalarLevel::Topic], 0);
            assert_eq!(counts[&ScalarLevel::Lesson], 2);
            assert_eq!(counts.values().sum::<usize>(), collection.len());
        }
    }

    describe "remove_entry" {
        it "removes only the first match" {
            collection.add_entry(ScalarEntry::new(ScalarLevel::Clo, "1", "first"));
            collection.add_entry(ScalarEntry::new(ScalarLevel::Clo, "1", "second"));

            assert!(collection.remove_entry(ScalarLevel::Clo, "1"));

            assert_eq!(collection.len(), 1);
            assert_eq!(collection.entries[0].text, "second");
        }

        it "reports a miss" {
            collection.add_entry(ScalarEntry::new(ScalarLevel::Clo, "1", "first"));

            assert!(!collection.remove_entry(ScalarLevel::Topic, "1"));
            assert_eq!(collection.len(), 1);
        }
    }

    describe "update_entry" {
        it "changes serial and text independently" {
            collection.add_entry(ScalarEntry::new(ScalarLevel::Topic, "1.1", "Network"));

            assert!(collection.update_entry(ScalarLevel::Topic, "1.1", None, Some("Networks")));
            assert!(collection.update_entry(ScalarLevel::Topic, "1.1", Some("2.1"), None));

            let entry = collection.find(ScalarLevel::Topic, "2.1").unwrap();
            assert_eq!(entry.text, "Networks");
        }

        it "reports a miss" {
            assert!(!collection.update_entry(ScalarLevel::Topic, "9", Some("10"), None));
        }
    }

    describe "reorder_level" {
        before {
            for serial in ["a", "b", "c"] {
                collection.add_entry(ScalarEntry::new(ScalarLevel::Lesson, serial, serial));
            }
        }

        it "assigns positions in list order" {
            collection.reorder_level(ScalarLevel::Lesson, &strings(&["c", "a", "b"]));

            assert_eq!(serials(&collection, ScalarLevel::Lesson), strings(&["c", "a", "b"]));
            let positions: Vec<u32> = collection
                .get_by_level(ScalarLevel::Lesson)
                .iter()
                .map(|e| e.order_index)
                .collect();
            assert_eq!(positions, vec![1, 2, 3]);
        }

        it "skips unknown serials but consumes their position" {
            collection.reorder_level(ScalarLevel::Lesson, &strings(&["zz", "c", "b", "a"]));

            let c = collection.find(ScalarLevel::Lesson, "c").unwrap();
            assert_eq!(c.order_index, 2);
            assert_eq!(serials(&collection, ScalarLevel::Lesson), strings(&["c", "b", "a"]));
        }

        it "does not touch other levels" {
            collection.add_entry(ScalarEntry::new(ScalarLevel::Clo, "a", "Identify threats").with_order_index(5));

            collection.reorder_level(ScalarLevel::Lesson, &strings(&["a"]));

            assert_eq!(collection.find(ScalarLevel::Clo, "a").unwrap().order_index, 5);
        }

        it "is idempotent after renumbering" {
            let order = strings(&["b", "c", "a"]);
            collection.reorder_level(ScalarLevel::Lesson, &order);
            collection.renumber_level(ScalarLevel::Lesson, "");
            let once = collection.clone();

            let renumbered = collection.serials(ScalarLevel::Lesson);
            collection.reorder_level(ScalarLevel::Lesson, &renumbered);
            collection.renumber_level(ScalarLevel::Lesson, "");

            assert_eq!(collection, once);
        }
    }

    describe "renumber_level" {
        it "follows display order and applies the prefix" {
            collection.add_entry(ScalarEntry::new(ScalarLevel::PerformanceCriteria, "x", "X").with_order_index(3));
            collection.add_entry(ScalarEntry::new(ScalarLevel::PerformanceCriteria, "y", "Y").with_order_index(1));

            collection.renumber_level(ScalarLevel::PerformanceCriteria, "PC");

            let entries = collection.get_by_level(ScalarLevel::PerformanceCriteria);
            assert_eq!(entries[0].serial, "PC1");
            assert_eq!(entries[0].text, "Y");
            assert_eq!(entries[1].serial, "PC2");
            assert_eq!(entries[1].order_index, 2);
        }

        it "leaves an empty level and the others untouched" {
            collection.add_entry(ScalarEntry::new(ScalarLevel::Clo, "7", "Identify threats"));
            let before = collection.clone();

            collection.renumber_level(ScalarLevel::Topic, "");

            assert!(collection.get_by_level(ScalarLevel::Topic).is_empty());
            assert_eq!(collection, before);
        }

        it "gives the same result regardless of the serials it starts from" {
            let mut other = ScalarCollection::new();
            for (name, serial) in [("one", "7"), ("two", "3")] {
                collection.add_entry(ScalarEntry::new(ScalarLevel::Topic, serial, name));
                other.add_entry(ScalarEntry::new(ScalarLevel::Topic, format!("{}x", serial), name));
            }

            collection.renumber_level(ScalarLevel::Topic, "");
            other.renumber_level(ScalarLevel::Topic, "");

            assert_eq!(collection, other);
        }
    }

    describe "serialization" {
        it "round-trips through the stored list form" {
            collection.add_entry(ScalarEntry::new(ScalarLevel::Clo, "1", "Identify threats"));
            collection.add_entry(ScalarEntry::new(ScalarLevel::Topic, "1.1", "Network").with_parent("1"));
            collection.entries[1].metadata.insert("hours".into(), json!(3));

            let restored = ScalarCollection::from_list(&collection.to_list());

            assert_eq!(restored, collection);
        }

        it "writes the stored keys" {
            collection.add_entry(ScalarEntry::new(ScalarLevel::PerformanceCriteria, "PC1", "Configure rules"));

            let value = &collection.to_list()[0];
            assert_eq!(value["level"], "PerformanceCriteria");
            assert_eq!(value["serial"], "PC1");
            assert_eq!(value["order_index"], 1);
            assert!(value["parent_serial"].is_null());
            assert!(value["metadata"].is_object());
        }

        it "fills defaults for sparse stored entries" {
            let restored = ScalarCollection::from_list(&[json!({ "text": "Orphan" })]);

            let entry = &restored.entries[0];
            assert_eq!(entry.level, ScalarLevel::Clo);
            assert_eq!(entry.serial, "");
            assert_eq!(entry.order_index, 0);
            assert!(entry.metadata.is_empty());
        }

        it "falls back to CLO for an unknown level" {
            let restored = ScalarCollection::from_list(&[json!({ "level": "Module", "serial": "1", "text": "x" })]);

            assert_eq!(restored.entries[0].level, ScalarLevel::Clo);
        }
    }

    describe "clear" {
        it "clears one level or everything" {
            collection.add_entry(ScalarEntry::new(ScalarLevel::Clo, "1", "Identify threats"));
            collection.add_entry(ScalarEntry::new(ScalarLevel::Topic, "1.1", "Network"));

            collection.clear_level(ScalarLevel::Topic);
            assert_eq!(collection.count_by_level(ScalarLevel::Topic), 0);
            assert_eq!(collection.len(), 1);

            collection.clear();
            assert!(collection.is_empty());
        }
    }
}
