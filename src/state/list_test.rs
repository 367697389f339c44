use super::*;
use crate::store::MemoryStore;

fn empty_list() -> (ShoppingList<MemoryStore>, MemoryStore) {
    let store = MemoryStore::new();
    (ShoppingList::load(store.clone()), store)
}

fn stored_items(store: &MemoryStore) -> Vec<ShoppingListItem> {
    let raw = store.get(SHOPPING_LIST_KEY).unwrap().expect("list persisted");
    serde_json::from_str(&raw).unwrap()
}

fn names<S: KeyValueStore>(list: &ShoppingList<S>) -> Vec<&str> {
    list.items().iter().map(|i| i.name.as_str()).collect()
}

// =============================================================
// load
// =============================================================

#[test]
fn load_empty_store_is_empty() {
    let (list, _) = empty_list();
    assert!(list.is_empty());
}

#[test]
fn load_tolerates_missing_optional_fields() {
    let store = MemoryStore::new();
    store
        .insert_raw(SHOPPING_LIST_KEY, r#"[{"id":"a","name":"Eggs"},{"id":"b","name":"Tea","purchased":true,"price":2.5}]"#)
        .unwrap();
    let list = ShoppingList::load(store);
    let eggs = list.get("a").unwrap();
    assert_eq!(eggs.quantity, "1");
    assert!(!eggs.purchased);
    assert_eq!(eggs.price, None);
    assert_eq!(list.get("b").unwrap().price, Some(2.5));
}

#[test]
fn load_null_or_blank_quantity_defaults_to_one() {
    let store = MemoryStore::new();
    store
        .insert_raw(SHOPPING_LIST_KEY, r#"[{"id":"a","name":"Milk","quantity":null},{"id":"b","name":"Eggs","quantity":"  "}]"#)
        .unwrap();
    let list = ShoppingList::load(store);
    assert_eq!(list.len(), 2);
    assert_eq!(list.get("a").unwrap().quantity, "1");
    assert_eq!(list.get("b").unwrap().quantity, "1");
}

#[test]
fn load_drops_only_unreadable_entries() {
    let store = MemoryStore::new();
    store
        .insert_raw(
            SHOPPING_LIST_KEY,
            r#"[{"id":"a","name":"Milk","quantity":"2","purchased":false},{"id":"b","quantity":"1"},{"name":"Tea"}]"#,
        )
        .unwrap();
    let mut list = ShoppingList::load(store.clone());
    assert_eq!(names(&list), ["Milk"]);

    list.add_item("Bread", "");
    let stored: Vec<_> = stored_items(&store).into_iter().map(|i| i.name).collect();
    assert_eq!(stored, ["Bread", "Milk"]);
}

#[test]
fn load_corrupt_document_is_empty() {
    let store = MemoryStore::new();
    store.insert_raw(SHOPPING_LIST_KEY, "{oops").unwrap();
    assert!(ShoppingList::load(store).is_empty());
}

// =============================================================
// add_item
// =============================================================

#[test]
fn add_blank_name_is_noop() {
    let (mut list, store) = empty_list();
    assert!(list.add_item("   ", "2").is_none());
    assert!(list.add_item("", "").is_none());
    assert!(list.is_empty());
    assert!(store.get(SHOPPING_LIST_KEY).unwrap().is_none());
}

#[test]
fn add_defaults_quantity_to_one() {
    let (mut list, _) = empty_list();
    let id = list.add_item("Milk", "").unwrap();
    let item = list.get(&id).unwrap();
    assert_eq!(item.name, "Milk");
    assert_eq!(item.quantity, "1");
    assert!(!item.purchased);
    assert_eq!(item.price, None);
}

#[test]
fn add_trims_name_and_quantity() {
    let (mut list, _) = empty_list();
    let id = list.add_item("  Bread ", " 2 loaves ").unwrap();
    let item = list.get(&id).unwrap();
    assert_eq!(item.name, "Bread");
    assert_eq!(item.quantity, "2 loaves");
}

#[test]
fn add_prepends_most_recent_first() {
    let (mut list, store) = empty_list();
    list.add_item("a", "");
    list.add_item("b", "");
    list.add_item("c", "");
    assert_eq!(names(&list), ["c", "b", "a"]);
    assert_eq!(stored_items(&store).len(), 3);
}

#[test]
fn add_assigns_unique_ids() {
    let (mut list, _) = empty_list();
    let a = list.add_item("x", "").unwrap();
    let b = list.add_item("x", "").unwrap();
    assert_ne!(a, b);
}

// =============================================================
// add_multiple_items
// =============================================================

#[test]
fn bulk_add_preserves_batch_order_at_front() {
    let (mut list, _) = empty_list();
    list.add_item("old", "");
    let added = list.add_multiple_items(vec![DraftItem::new("flour", "2 cups"), DraftItem::new("sugar", "1 cup")]);
    assert_eq!(added, 2);
    assert_eq!(names(&list), ["flour", "sugar", "old"]);
    assert!(list.items().iter().all(|i| !i.purchased));
    assert_eq!(list.items()[0].quantity, "2 cups");
}

#[test]
fn bulk_add_persists() {
    let (mut list, store) = empty_list();
    list.add_multiple_items(vec![DraftItem::new("salt", "a pinch")]);
    let stored = stored_items(&store);
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].name, "salt");
}

// =============================================================
// update_item
// =============================================================

#[test]
fn update_purchase_then_unpurchase_clears_price() {
    let (mut list, _) = empty_list();
    let id = list.add_item("Cheese", "").unwrap();

    assert!(list.update_item(&id, &ItemPatch::purchased_at(3.5)));
    let item = list.get(&id).unwrap();
    assert!(item.purchased);
    assert_eq!(item.price, Some(3.5));

    assert!(list.update_item(&id, &ItemPatch::unpurchased()));
    let item = list.get(&id).unwrap();
    assert!(!item.purchased);
    assert_eq!(item.price, None);
}

#[test]
fn update_unpurchase_without_price_field_still_clears_price() {
    let (mut list, _) = empty_list();
    let id = list.add_item("Cheese", "").unwrap();
    list.mark_purchased(&id, 4.0);
    list.update_item(&id, &ItemPatch { purchased: Some(false), ..ItemPatch::default() });
    assert_eq!(list.get(&id).unwrap().price, None);
}

#[test]
fn update_price_on_unpurchased_item_is_dropped() {
    let (mut list, _) = empty_list();
    let id = list.add_item("Cheese", "").unwrap();
    list.update_item(&id, &ItemPatch { price: PricePatch::Set(2.0), ..ItemPatch::default() });
    assert_eq!(list.get(&id).unwrap().price, None);
}

#[test]
fn update_merges_only_given_fields() {
    let (mut list, _) = empty_list();
    let id = list.add_item("Apples", "3").unwrap();
    list.update_item(&id, &ItemPatch::default().with_quantity("6"));
    let item = list.get(&id).unwrap();
    assert_eq!(item.name, "Apples");
    assert_eq!(item.quantity, "6");
    assert_eq!(item.id, id);
}

#[test]
fn update_blank_name_keeps_old_name() {
    let (mut list, _) = empty_list();
    let id = list.add_item("Apples", "3").unwrap();
    list.update_item(&id, &ItemPatch::default().with_name("  "));
    assert_eq!(list.get(&id).unwrap().name, "Apples");
}

#[test]
fn update_unknown_id_is_noop() {
    let (mut list, _) = empty_list();
    list.add_item("Apples", "3");
    let before = list.items().to_vec();
    assert!(!list.update_item("missing", &ItemPatch::purchased_at(1.0)));
    assert_eq!(list.items(), before.as_slice());
}

// =============================================================
// mark / unmark / toggle
// =============================================================

#[test]
fn mark_purchased_rejects_invalid_prices() {
    let (mut list, _) = empty_list();
    let id = list.add_item("Fish", "").unwrap();
    assert!(!list.mark_purchased(&id, -1.0));
    assert!(!list.mark_purchased(&id, f64::NAN));
    assert!(!list.get(&id).unwrap().purchased);
}

#[test]
fn mark_purchased_accepts_zero() {
    let (mut list, _) = empty_list();
    let id = list.add_item("Free sample", "").unwrap();
    assert!(list.mark_purchased(&id, 0.0));
    assert_eq!(list.get(&id).unwrap().price, Some(0.0));
}

#[test]
fn toggle_flips_purchase_state() {
    let (mut list, _) = empty_list();
    let id = list.add_item("Rice", "").unwrap();
    assert!(list.toggle_item(&id, 2.0));
    assert!(list.get(&id).unwrap().purchased);
    assert!(list.toggle_item(&id, 9.0));
    let item = list.get(&id).unwrap();
    assert!(!item.purchased);
    assert_eq!(item.price, None);
    assert!(!list.toggle_item("missing", 1.0));
}

// =============================================================
// remove / clear
// =============================================================

#[test]
fn remove_drops_matching_item_only() {
    let (mut list, store) = empty_list();
    let a = list.add_item("a", "").unwrap();
    list.add_item("b", "");
    assert!(list.remove_item(&a));
    assert_eq!(names(&list), ["b"]);
    assert_eq!(stored_items(&store).len(), 1);
    assert!(!list.remove_item(&a));
}

#[test]
fn clear_empties_list() {
    let (mut list, store) = empty_list();
    list.add_item("a", "");
    list.add_item("b", "");
    list.clear_list();
    assert!(list.is_empty());
    assert!(stored_items(&store).is_empty());
}

#[test]
fn clear_empty_list_stays_empty() {
    let (mut list, _) = empty_list();
    list.clear_list();
    assert!(list.is_empty());
}

// =============================================================
// persistence failures
// =============================================================

#[test]
fn failing_store_keeps_in_memory_changes() {
    let (mut list, store) = empty_list();
    list.add_item("kept", "");
    store.set_fail_writes(true);

    list.add_item("memory only", "");
    assert_eq!(names(&list), ["memory only", "kept"]);
    assert_eq!(stored_items(&store).len(), 1);
}

#[test]
fn reload_restores_persisted_items() {
    let (mut list, store) = empty_list();
    let id = list.add_item("Butter", "250 g").unwrap();
    list.mark_purchased(&id, 2.2);

    let reloaded = ShoppingList::load(store);
    let item = reloaded.get(&id).unwrap();
    assert_eq!(item.quantity, "250 g");
    assert_eq!(item.price, Some(2.2));
}

#[test]
fn summary_tracks_mutations() {
    let (mut list, _) = empty_list();
    let a = list.add_item("a", "").unwrap();
    list.add_item("b", "");
    list.mark_purchased(&a, 5.0);
    let summary = list.summary();
    assert_eq!(summary.purchased, 1);
    assert!((summary.progress_percent - 50.0).abs() < 1e-9);
    assert!((summary.total_cost - 5.0).abs() < 1e-9);
}

#[test]
fn serialized_item_omits_missing_price() {
    let (mut list, store) = empty_list();
    list.add_item("Jam", "");
    let raw = store.get(SHOPPING_LIST_KEY).unwrap().unwrap();
    assert!(!raw.contains("price"));
    assert!(raw.contains("\"purchased\":false"));
}
