//! Scenario and edge case tests for fridge-engine
//!
//! These drive whole edit sessions the way a screen does, with the server's
//! answers played by hand.

use fridge_engine::{
    ChangeKind, CommitStep, EditSession, Entity, EntityId, EntityStore, Error, FieldPendingBuffer,
    FieldValue, Fridge, FridgeField, GroceryField, GroceryItem, PendingInput, SessionState,
    StoreSnapshot,
};

fn home() -> Vec<Fridge> {
    vec![Fridge::new(1, "Home")]
}

fn groceries() -> Vec<GroceryItem> {
    vec![
        GroceryItem::new(5, "Milk", 2.0, "l").with_order(0),
        GroceryItem::new(6, "Eggs", 6.0, "").with_order(1),
        GroceryItem::new(7, "Flour", 1.0, "kg").with_order(2),
    ]
}

// ============================================================================
// Session scenarios
// ============================================================================

#[test]
fn add_then_cancel_restores_server_list() {
    let server = home();
    let mut session = EditSession::new();
    session.start_edit(&server).unwrap();

    session.add_fridge_locally("Office").unwrap();
    assert_eq!(session.entities().len(), 2);
    assert!(session.has_changes());

    session.cancel_edit(&server).unwrap();
    assert_eq!(session.entities(), server.as_slice());
    assert!(!session.has_changes());
    assert_eq!(session.state(), SessionState::Idle);
}

#[test]
fn rename_commit_updates_once() {
    let mut store = EntityStore::new();
    store.replace(home(), 1000);

    let mut session = EditSession::new();
    session.start_edit(store.list()).unwrap();
    session
        .edit_fridge_locally(EntityId::Server(1), "New Name")
        .unwrap();

    let steps = session.begin_commit().unwrap().into_steps();
    assert_eq!(steps.len(), 1);
    let CommitStep::Update(id, fields) = &steps[0] else {
        panic!("expected an update, got {:?}", steps[0]);
    };
    assert_eq!(*id, 1);
    assert_eq!(
        fields.get(FridgeField::Name),
        Some(&FieldValue::from("New Name"))
    );

    // Server confirms, then the list is refreshed.
    session.acknowledge(EntityId::Server(1)).unwrap();
    store.replace(vec![Fridge::new(1, "New Name")], 2000);
    session.finish_commit(store.list()).unwrap();

    assert_eq!(store.get(EntityId::Server(1)).unwrap().name, "New Name");
    assert!(!session.has_changes());
}

#[test]
fn commit_plan_orders_delete_update_create() {
    let server = vec![Fridge::new(1, "Home"), Fridge::new(2, "Office")];
    let mut session = EditSession::new();
    session.start_edit(&server).unwrap();

    // Recorded in the reverse of commit order on purpose.
    session.add_fridge_locally("Cabin").unwrap();
    session
        .edit_fridge_locally(EntityId::Server(2), "Work")
        .unwrap();
    session.delete_locally(EntityId::Server(1)).unwrap();

    let steps = session.begin_commit().unwrap().into_steps();
    assert!(matches!(steps[0], CommitStep::Delete(1)));
    assert!(matches!(steps[1], CommitStep::Update(2, _)));
    assert!(matches!(steps[2], CommitStep::Create(_, _)));
}

#[test]
fn create_then_delete_sends_nothing() {
    let mut session = EditSession::new();
    session.start_edit(&home()).unwrap();

    let temp = session.add_fridge_locally("Office").unwrap();
    session.delete_locally(EntityId::Temp(temp)).unwrap();

    assert!(!session.has_changes());
    assert!(session.begin_commit().unwrap().is_empty());
}

#[test]
fn edit_then_delete_drops_the_update() {
    let mut session = EditSession::new();
    session.start_edit(&home()).unwrap();

    session
        .edit_fridge_locally(EntityId::Server(1), "Cabin")
        .unwrap();
    session.delete_locally(EntityId::Server(1)).unwrap();

    let change = session.change_log().get(EntityId::Server(1)).unwrap();
    assert_eq!(change.kind, ChangeKind::Delete);
    assert_eq!(change.original.as_ref().unwrap().name, "Home");

    let plan = session.begin_commit().unwrap();
    assert_eq!(plan.deletes, vec![1]);
    assert!(plan.updates.is_empty());
}

#[test]
fn edits_of_a_new_entity_fold_into_its_create() {
    let mut session = EditSession::new();
    session.start_edit(&home()).unwrap();

    let temp = session.add_fridge_locally("Ofice").unwrap();
    session
        .edit_fridge_locally(EntityId::Temp(temp), "Office")
        .unwrap();

    let plan = session.begin_commit().unwrap();
    assert!(plan.updates.is_empty());
    assert_eq!(plan.creates.len(), 1);
    assert_eq!(
        plan.creates[0].1.get(FridgeField::Name),
        Some(&FieldValue::from("Office"))
    );
}

#[test]
fn failed_commit_keeps_unconfirmed_changes() {
    let server = vec![Fridge::new(1, "Home"), Fridge::new(2, "Office")];
    let mut session = EditSession::new();
    session.start_edit(&server).unwrap();
    session.delete_locally(EntityId::Server(1)).unwrap();
    let temp = session.add_fridge_locally("Cabin").unwrap();

    session.begin_commit().unwrap();
    // The delete went through, the create failed.
    session.acknowledge(EntityId::Server(1)).unwrap();
    session.abort_commit().unwrap();

    assert_eq!(session.state(), SessionState::Editing);
    assert_eq!(session.change_log().len(), 1);

    let plan = session.begin_commit().unwrap();
    assert!(plan.deletes.is_empty());
    assert_eq!(plan.creates[0].0, temp);
}

#[test]
fn confirmed_create_replaces_temporary_entity() {
    let mut session = EditSession::new();
    session.start_edit(&home()).unwrap();
    let temp = session.add_fridge_locally("Office").unwrap();

    session.begin_commit().unwrap();
    session
        .confirm_create(temp, Fridge::new(42, "Office"))
        .unwrap();

    assert!(session.get(EntityId::Temp(temp)).is_none());
    assert_eq!(session.get(EntityId::Server(42)).unwrap().name, "Office");
    assert!(!session.has_changes());
}

#[test]
fn temp_ids_are_not_reused_across_sessions() {
    let mut session = EditSession::new();
    session.start_edit(&home()).unwrap();
    let first = session.add_fridge_locally("Office").unwrap();
    session.cancel_edit(&home()).unwrap();

    session.start_edit(&home()).unwrap();
    let second = session.add_fridge_locally("Office").unwrap();

    assert_ne!(first, second);
}

#[test]
fn hidden_toggle_is_not_a_change() {
    let mut session = EditSession::new();
    session.start_edit(&home()).unwrap();

    session.toggle_hidden_locally(EntityId::Server(1)).unwrap();

    assert!(session.get(EntityId::Server(1)).unwrap().is_hidden);
    assert!(!session.has_changes());
}

// ============================================================================
// State machine misuse
// ============================================================================

#[test]
fn mutations_require_editing() {
    let mut session: EditSession<Fridge> = EditSession::new();

    assert_eq!(
        session.add_fridge_locally("Office"),
        Err(Error::NotEditing)
    );
    assert_eq!(
        session.delete_locally(EntityId::Server(1)),
        Err(Error::NotEditing)
    );
    assert_eq!(session.cancel_edit(&home()), Err(Error::NotEditing));
}

#[test]
fn no_mutations_while_committing() {
    let mut session = EditSession::new();
    session.start_edit(&home()).unwrap();
    session.begin_commit().unwrap();

    let err = session
        .edit_fridge_locally(EntityId::Server(1), "Cabin")
        .unwrap_err();
    assert_eq!(
        err,
        Error::InvalidState {
            expected: SessionState::Editing,
            actual: SessionState::Committing,
        }
    );
    assert!(session.cancel_edit(&home()).is_err());
}

#[test]
fn start_edit_twice_fails() {
    let mut session = EditSession::new();
    session.start_edit(&home()).unwrap();
    assert!(matches!(
        session.start_edit(&home()),
        Err(Error::InvalidState { .. })
    ));
}

#[test]
fn unknown_entity_is_reported() {
    let mut session = EditSession::new();
    session.start_edit(&home()).unwrap();

    assert_eq!(
        session.delete_locally(EntityId::Server(99)),
        Err(Error::EntityNotFound(EntityId::Server(99)))
    );
}

// ============================================================================
// Validation edge cases
// ============================================================================

#[test]
fn blank_and_control_names_are_rejected() {
    let mut session = EditSession::new();
    session.start_edit(&home()).unwrap();

    assert!(matches!(
        session.add_fridge_locally("   "),
        Err(Error::BlankField(_))
    ));
    assert!(matches!(
        session.add_fridge_locally("Home\u{0}"),
        Err(Error::InvalidCharacters(_))
    ));
    assert!(!session.has_changes());
}

#[test]
fn names_are_trimmed() {
    let mut session = EditSession::new();
    session.start_edit(&home()).unwrap();

    let temp = session.add_fridge_locally("  Office ").unwrap();
    assert_eq!(session.get(EntityId::Temp(temp)).unwrap().name, "Office");
}

#[test]
fn unicode_names_are_kept() {
    let mut session = EditSession::new();
    session.start_edit(&home()).unwrap();

    for name in ["日本語", "Привет", "🎉 Party"] {
        let temp = session.add_fridge_locally(name).unwrap();
        assert_eq!(session.get(EntityId::Temp(temp)).unwrap().name, name);
    }
}

#[test]
fn item_quantity_must_be_positive() {
    let mut session = EditSession::new();
    session.start_edit(&groceries()).unwrap();

    for quantity in [0.0, -1.0, f64::NAN, f64::INFINITY] {
        assert!(session.add_item_locally("Bread", quantity, "").is_err());
    }
    assert!(!session.has_changes());
}

// ============================================================================
// Grocery lists
// ============================================================================

#[test]
fn new_items_are_appended_at_the_end() {
    let mut session = EditSession::new();
    session.start_edit(&groceries()).unwrap();

    let temp = session.add_item_locally("Bread", 1.0, "").unwrap();
    assert_eq!(session.get(EntityId::Temp(temp)).unwrap().order, 3);
}

#[test]
fn reorder_records_only_moved_items() {
    let mut session = EditSession::new();
    session.start_edit(&groceries()).unwrap();

    session
        .reorder_locally(&[
            EntityId::Server(6),
            EntityId::Server(5),
            EntityId::Server(7),
        ])
        .unwrap();

    let plan = session.begin_commit().unwrap();
    let moved: Vec<_> = plan.updates.iter().map(|(id, _)| *id).collect();
    assert_eq!(moved, vec![6, 5]);
    assert_eq!(
        plan.updates[0].1.get(GroceryField::Order),
        Some(&FieldValue::Position(0))
    );
}

#[test]
fn reorder_rejects_incomplete_order() {
    let mut session = EditSession::new();
    session.start_edit(&groceries()).unwrap();

    assert!(matches!(
        session.reorder_locally(&[EntityId::Server(5), EntityId::Server(6)]),
        Err(Error::InvalidReorder(_))
    ));
    assert!(matches!(
        session.reorder_locally(&[
            EntityId::Server(5),
            EntityId::Server(5),
            EntityId::Server(7),
        ]),
        Err(Error::InvalidReorder(_))
    ));
    assert!(!session.has_changes());
}

#[test]
fn fridges_cannot_be_reordered() {
    let mut session = EditSession::new();
    session.start_edit(&home()).unwrap();

    assert_eq!(
        session.reorder_locally(&[EntityId::Server(1)]),
        Err(Error::NotReorderable(Fridge::KIND))
    );
}

// ============================================================================
// Inline field edits
// ============================================================================

#[test]
fn zero_quantity_keeps_server_value() {
    let mut store = EntityStore::new();
    store.replace(groceries(), 1000);
    let mut buffer: FieldPendingBuffer<GroceryItem> = FieldPendingBuffer::new();

    assert!(buffer
        .set_field(5, GroceryField::Quantity, FieldValue::Number(0.0))
        .is_err());

    let milk = store.get(EntityId::Server(5)).unwrap();
    assert_eq!(
        buffer.display_value(milk, GroceryField::Quantity),
        FieldValue::Number(2.0)
    );
    assert!(buffer.pending(5).is_none());
}

#[test]
fn discarding_the_buffer_restores_display() {
    let mut store = EntityStore::new();
    store.replace(groceries(), 1000);
    let mut buffer: FieldPendingBuffer<GroceryItem> = FieldPendingBuffer::new();

    let mut name = PendingInput::new(5, GroceryField::Name);
    name.type_text("Oat milk");
    buffer.end_editing(&mut [&mut name]);

    let milk = store.get(EntityId::Server(5)).unwrap().clone();
    assert_eq!(buffer.display(&milk).name, "Oat milk");

    buffer.clear();
    assert_eq!(buffer.display(&milk), milk);
}

#[test]
fn drained_update_carries_every_field() {
    let mut store = EntityStore::new();
    store.replace(groceries(), 1000);
    let mut buffer: FieldPendingBuffer<GroceryItem> = FieldPendingBuffer::new();
    buffer
        .set_field(7, GroceryField::Unit, FieldValue::from("g"))
        .unwrap();

    let updates = buffer.drain_updates(&store);

    let (_, fields) = &updates[0];
    assert_eq!(fields.len(), 5);
    assert_eq!(fields.get(GroceryField::Name), Some(&FieldValue::from("Flour")));
    assert_eq!(fields.get(GroceryField::Unit), Some(&FieldValue::from("g")));
}

// ============================================================================
// Snapshots
// ============================================================================

#[test]
fn snapshot_survives_json() {
    let mut store = EntityStore::new();
    store.replace(groceries(), 1000);

    let json = store.export_state(2000).to_json().unwrap();
    let mut restored = EntityStore::new();
    restored
        .import_state(StoreSnapshot::<GroceryItem>::from_json(&json).unwrap())
        .unwrap();

    assert_eq!(restored.list(), store.list());
    assert_eq!(restored.refreshed_at(), Some(2000));
}

#[test]
fn garbage_snapshot_is_rejected() {
    assert!(matches!(
        StoreSnapshot::<Fridge>::from_json("not json"),
        Err(Error::InvalidSnapshot(_))
    ));
}
