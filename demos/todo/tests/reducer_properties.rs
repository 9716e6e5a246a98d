//! Property tests for the to-do reducers.

#![allow(clippy::unwrap_used)]

use proptest::prelude::*;
use tidy_redux_core::Reducer;
use todo::{AppAction, AppState, VisibilityFilter, root_reducer};

fn filter_strategy() -> impl Strategy<Value = VisibilityFilter> {
    prop_oneof![
        Just(VisibilityFilter::ShowAll),
        Just(VisibilityFilter::ShowActive),
        Just(VisibilityFilter::ShowCompleted),
    ]
}

fn sync_action_strategy() -> impl Strategy<Value = AppAction> {
    prop_oneof![
        ("[a-z]{1,8}", any::<bool>())
            .prop_map(|(text, completed)| AppAction::AddTodo { text, completed }),
        (0usize..12).prop_map(|index| AppAction::ToggleTodo { index }),
        filter_strategy().prop_map(|filter| AppAction::SetVisibilityFilter { filter }),
    ]
}

fn apply(actions: &[AppAction]) -> AppState {
    let reducer = root_reducer();
    actions
        .iter()
        .fold(AppState::default(), |state, action| reducer.reduce(&state, action))
}

proptest! {
    #[test]
    fn prop_ids_match_positions(actions in prop::collection::vec(sync_action_strategy(), 0..40)) {
        let adds = actions
            .iter()
            .filter(|a| matches!(a, AppAction::AddTodo { .. }))
            .count();

        let state = apply(&actions);

        prop_assert_eq!(state.todos.len(), adds);
        for (position, todo) in state.todos.iter().enumerate() {
            prop_assert_eq!(todo.id, position);
        }
    }

    #[test]
    fn prop_added_items_start_incomplete(
        actions in prop::collection::vec(sync_action_strategy(), 0..20),
        text in "[a-z]{1,8}",
        completed in any::<bool>(),
    ) {
        let reducer = root_reducer();
        let state = apply(&actions);

        let next = reducer.reduce(&state, &AppAction::AddTodo { text, completed });

        let added = next.todos.last().unwrap();
        prop_assert_eq!(added.id, state.todos.len());
        prop_assert!(!added.completed);
    }

    #[test]
    fn prop_toggle_twice_is_identity(
        actions in prop::collection::vec(sync_action_strategy(), 0..20),
        index in 0usize..12,
    ) {
        let reducer = root_reducer();
        let state = apply(&actions);
        let toggle = AppAction::ToggleTodo { index };

        let twice = reducer.reduce(&reducer.reduce(&state, &toggle), &toggle);

        prop_assert_eq!(twice, state);
    }

    #[test]
    fn prop_active_and_completed_partition_all(
        actions in prop::collection::vec(sync_action_strategy(), 0..30),
    ) {
        let state = apply(&actions);
        let with_filter = |filter| AppState { visibility_filter: filter, ..state.clone() };

        let all = with_filter(VisibilityFilter::ShowAll);
        let active = with_filter(VisibilityFilter::ShowActive);
        let completed = with_filter(VisibilityFilter::ShowCompleted);

        prop_assert_eq!(all.visible_todos().len(), state.todos.len());
        prop_assert_eq!(
            active.visible_todos().len() + completed.visible_todos().len(),
            state.todos.len()
        );
        prop_assert!(active.visible_todos().iter().all(|t| !t.completed));
        prop_assert!(completed.visible_todos().iter().all(|t| t.completed));
    }

    #[test]
    fn prop_reducer_never_mutates_input(
        actions in prop::collection::vec(sync_action_strategy(), 0..20),
        next in sync_action_strategy(),
    ) {
        let reducer = root_reducer();
        let state = apply(&actions);
        let before = state.clone();

        let _ = reducer.reduce(&state, &next);

        prop_assert_eq!(state, before);
    }

    #[test]
    fn prop_async_requests_leave_state_unchanged(
        actions in prop::collection::vec(sync_action_strategy(), 0..20),
        text in "[a-z]{1,8}",
        delay_ms in 0u64..1000,
    ) {
        let reducer = root_reducer();
        let state = apply(&actions);
        let request = AppAction::AddTodoAsyncWithStoreScope {
            text,
            completed: false,
            delay: std::time::Duration::from_millis(delay_ms),
        };

        prop_assert_eq!(reducer.reduce(&state, &request), state);
    }
}
