use proptest::prelude::*;
use serde_json::Value;
use viewstate::{Criteria, FilterStore, Identify, PaginationStore, PredicateSet, SelectionStore};

#[derive(Clone, Debug, PartialEq)]
struct Row {
    id: usize,
    status: u8,
    amount: u32,
}

impl Identify for Row {
    type Id = usize;

    fn id(&self) -> usize {
        self.id
    }
}

fn rows_strategy() -> impl Strategy<Value = Vec<Row>> {
    proptest::collection::vec((0u8..4, 0u32..1000), 0..120).prop_map(|fields| {
        fields
            .into_iter()
            .enumerate()
            .map(|(id, (status, amount))| Row { id, status, amount })
            .collect()
    })
}

fn criterion_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        Just(Value::from("")),
        Just(Value::from("all")),
        (0u8..4).prop_map(|s| Value::from(s.to_string())),
    ]
}

fn predicates() -> PredicateSet<Row> {
    PredicateSet::new()
        .with("status", |row: &Row, value: &Value| {
            value.as_str() == Some(row.status.to_string().as_str())
        })
        .with("min_amount", |row: &Row, value: &Value| {
            value.as_u64().is_some_and(|min| u64::from(row.amount) >= min)
        })
}

fn is_subsequence(sub: &[Row], all: &[Row]) -> bool {
    let mut rest = all.iter();
    sub.iter().all(|item| rest.any(|candidate| candidate == item))
}

proptest! {
    #[test]
    fn filtered_view_is_an_ordered_subsequence(
        rows in rows_strategy(),
        status in criterion_strategy(),
        min_amount in proptest::option::of(0u64..1000),
    ) {
        let store = FilterStore::new(rows.clone(), predicates());
        store.set_filter("status", status.clone());
        if let Some(min) = min_amount {
            store.set_filter("min_amount", min);
        }

        let view = store.filtered_view();
        prop_assert!(is_subsequence(&view, &rows));

        let criteria = store.criteria();
        let predicates = predicates();
        for row in &view {
            prop_assert!(predicates.matches(row, &criteria));
        }
        let excluded = rows.len() - view.len();
        let failing = rows.iter().filter(|row| !predicates.matches(row, &criteria)).count();
        prop_assert_eq!(excluded, failing);
    }

    #[test]
    fn filtering_is_idempotent(rows in rows_strategy(), status in criterion_strategy()) {
        let criteria: Criteria = [("status", status)].into_iter().collect();

        let once = FilterStore::new(rows, predicates());
        once.replace_criteria(criteria.clone());
        let first = once.filtered_view();

        let twice = FilterStore::new(first.clone(), predicates());
        twice.replace_criteria(criteria);
        prop_assert_eq!(twice.filtered_view(), first);
    }

    #[test]
    fn pages_cover_the_input_exactly(rows in rows_strategy(), page_size in 1usize..30) {
        prop_assume!(!rows.is_empty());
        let store = PaginationStore::new(rows.clone(), page_size);

        let mut collected = Vec::new();
        for page in 1..=store.total_pages() {
            store.go_to_page(page as i64);
            let slice = store.page_slice();
            prop_assert!(!slice.is_empty());
            prop_assert!(slice.len() <= page_size);
            collected.extend(slice);
        }
        prop_assert_eq!(collected, rows);
    }

    #[test]
    fn current_page_stays_in_range(
        rows in rows_strategy(),
        page_size in 0usize..30,
        requests in proptest::collection::vec(any::<i64>(), 1..20),
    ) {
        let store = PaginationStore::new(rows, page_size);
        for request in requests {
            store.go_to_page(request);
            let page = store.current_page();
            prop_assert!(page >= 1 && page <= store.total_pages());
        }
    }

    #[test]
    fn select_all_minus_one(rows in rows_strategy(), pick in any::<prop::sample::Index>()) {
        prop_assume!(!rows.is_empty());
        let id = pick.get(&rows).id;
        let selection = SelectionStore::new(rows.clone());

        selection.select_all();
        selection.toggle_selection(&id);

        prop_assert_eq!(selection.selected_count(), rows.len() - 1);
        prop_assert!(!selection.is_selected(&id));

        selection.clear_selection();
        prop_assert!(!selection.has_selection());
        prop_assert_eq!(selection.selected_count(), 0);
    }
}
