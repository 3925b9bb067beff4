#![allow(missing_docs)]

use canopy::{
    access::{AccessPolicy, Principal, Role, SecuredBackend, SecurityContext},
    storage::StoreOptions,
    types::Operation,
    Category, CanopyError, CategoryStore, MemoryBackend, TreeCache,
};

type SecuredStore = CategoryStore<SecuredBackend<MemoryBackend>>;

fn secured_store() -> (SecuredStore, SecurityContext) {
    let context = SecurityContext::new();
    let backend = SecuredBackend::new(MemoryBackend::new(StoreOptions::default()), context.clone());
    (CategoryStore::new(backend), context)
}

/// Builds `root -> {left -> {leaf}, right}` as a plain user.
fn seeded(store: &mut SecuredStore, context: &SecurityContext) -> [Category; 4] {
    context.sign_in(Principal::user("ann"));
    let root = store.insert(Category::new("root")).unwrap();
    let left = store
        .insert(Category::new("left").with_parent(root.key()))
        .unwrap();
    let right = store
        .insert(Category::new("right").with_parent(root.key()))
        .unwrap();
    let leaf = store
        .insert(Category::new("leaf").with_parent(left.key()))
        .unwrap();
    [root, left, right, leaf]
}

#[test]
fn users_browse_and_edit() {
    let (mut store, context) = secured_store();
    let [root, left, _, leaf] = seeded(&mut store, &context);

    let mut renamed = leaf.clone();
    renamed.name = "leaf renamed".into();
    store.update(renamed).unwrap();

    let cache = TreeCache::new(&store);
    cache.refresh().unwrap();
    assert_eq!(cache.root_keys(), vec![root.key()]);
    assert_eq!(cache.children_of(left.key()).unwrap(), Some(vec![leaf.key()]));
}

#[test]
fn user_cannot_delete_and_tree_is_unchanged() {
    let (mut store, context) = secured_store();
    let [root, left, right, leaf] = seeded(&mut store, &context);

    assert_eq!(
        store.delete(&left),
        Err(CanopyError::AccessDenied {
            operation: Operation::Remove,
            principal: "ann".into(),
        })
    );

    assert_eq!(store.len().unwrap(), 4);
    assert_eq!(store.get_by_key(leaf.key()).unwrap().parent, Some(left.key()));
    assert_eq!(store.get_by_key(leaf.key()).unwrap().version(), 1);
    let children: Vec<_> = store
        .children(root.key())
        .unwrap()
        .iter()
        .map(Category::key)
        .collect();
    assert_eq!(children, [left.key(), right.key()]);
}

#[test]
fn admin_deletes_and_reparents() {
    let (mut store, context) = secured_store();
    let [root, left, _, leaf] = seeded(&mut store, &context);

    context.sign_in(Principal::admin("root"));
    store.delete(&left).unwrap();
    assert!(!store.contains(left.key()).unwrap());
    assert_eq!(store.get_by_key(leaf.key()).unwrap().parent, Some(root.key()));

    // Admin implies User for the re-link merges and later reads.
    assert_eq!(store.children(root.key()).unwrap().len(), 2);
}

#[test]
fn anonymous_callers_are_denied_everything() {
    let (mut store, context) = secured_store();
    let [root, ..] = seeded(&mut store, &context);
    context.sign_out();

    let denied = |operation| CanopyError::AccessDenied {
        operation,
        principal: "anonymous".into(),
    };
    assert_eq!(store.root_categories(), Err(denied(Operation::Read)));
    assert_eq!(store.get_by_key(root.key()), Err(denied(Operation::Read)));
    assert_eq!(
        store.insert(Category::new("late")),
        Err(denied(Operation::Read))
    );

    let cache = TreeCache::new(&store);
    assert_eq!(cache.refresh(), Err(denied(Operation::Read)));
    assert!(!cache.is_populated());
}

#[test]
fn principal_without_roles_cannot_read() {
    let (store, context) = secured_store();
    context.sign_in(Principal::new("guest", []));
    assert!(matches!(
        store.root_categories(),
        Err(CanopyError::AccessDenied { operation: Operation::Read, .. })
    ));
    assert!(Principal::new("both", [Role::User, Role::Admin]).has_role(Role::Admin));
}

/// Lets users remove records but reserves edits for admins.
struct RemoveOnlyPolicy;

impl AccessPolicy for RemoveOnlyPolicy {
    fn required_role(&self, operation: Operation) -> Option<Role> {
        match operation {
            Operation::Merge => Some(Role::Admin),
            Operation::Read | Operation::Persist | Operation::Remove => Some(Role::User),
        }
    }
}

#[test]
fn delete_needing_a_denied_relink_changes_nothing() {
    let context = SecurityContext::new();
    let backend = SecuredBackend::with_policy(
        MemoryBackend::new(StoreOptions::default()),
        context.clone(),
        RemoveOnlyPolicy,
    );
    let mut store = CategoryStore::new(backend);
    context.sign_in(Principal::user("ann"));
    let root = store.insert(Category::new("root")).unwrap();
    let child = store
        .insert(Category::new("child").with_parent(root.key()))
        .unwrap();

    assert_eq!(
        store.delete(&root),
        Err(CanopyError::AccessDenied {
            operation: Operation::Merge,
            principal: "ann".into(),
        })
    );
    assert!(store.contains(root.key()).unwrap());
    assert_eq!(store.get_by_key(child.key()).unwrap(), child);
    let roots: Vec<_> = store
        .root_categories()
        .unwrap()
        .iter()
        .map(Category::key)
        .collect();
    assert_eq!(roots, [root.key()]);
    assert_eq!(store.len().unwrap(), 2);

    // a leaf re-links nothing, so the remove role alone is enough
    store.delete(&child).unwrap();
    assert_eq!(store.len().unwrap(), 1);
}
