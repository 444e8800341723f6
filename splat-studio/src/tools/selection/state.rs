use bevy::prelude::*;

/// Which entity, if any, owns the manipulator.
#[derive(Resource, Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionState {
    selected: Option<Entity>,
}

/// Outcome of a selection transition, describing what to attach and detach.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionChange {
    Selected(Entity),
    Deselected(Entity),
    Switched { from: Entity, to: Entity },
    Unchanged,
}

impl SelectionState {
    pub fn selected(&self) -> Option<Entity> {
        self.selected
    }

    pub fn is_selected(&self, entity: Entity) -> bool {
        self.selected == Some(entity)
    }

    /// Selecting the current entity again toggles back to idle.
    pub fn select(&mut self, entity: Entity) -> SelectionChange {
        match self.selected {
            None => {
                self.selected = Some(entity);
                SelectionChange::Selected(entity)
            }
            Some(current) if current == entity => {
                self.selected = None;
                SelectionChange::Deselected(entity)
            }
            Some(current) => {
                self.selected = Some(entity);
                SelectionChange::Switched {
                    from: current,
                    to: entity,
                }
            }
        }
    }

    pub fn deselect(&mut self) -> SelectionChange {
        match self.selected.take() {
            Some(entity) => SelectionChange::Deselected(entity),
            None => SelectionChange::Unchanged,
        }
    }

    /// Drops the selection when the selected entity no longer exists.
    pub fn on_despawned(&mut self, entity: Entity) -> SelectionChange {
        if self.is_selected(entity) {
            self.deselect()
        } else {
            SelectionChange::Unchanged
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entities() -> (Entity, Entity) {
        let mut world = World::new();
        (world.spawn_empty().id(), world.spawn_empty().id())
    }

    #[test]
    fn double_select_returns_to_idle() {
        let (a, _) = entities();
        let mut state = SelectionState::default();

        assert_eq!(state.select(a), SelectionChange::Selected(a));
        assert_eq!(state.select(a), SelectionChange::Deselected(a));
        assert_eq!(state.selected(), None);
    }

    #[test]
    fn selecting_another_switches() {
        let (a, b) = entities();
        let mut state = SelectionState::default();
        state.select(a);

        assert_eq!(state.select(b), SelectionChange::Switched { from: a, to: b });
        assert!(state.is_selected(b));
        assert!(!state.is_selected(a));
    }

    #[test]
    fn deselect_and_despawn() {
        let (a, b) = entities();
        let mut state = SelectionState::default();
        assert_eq!(state.deselect(), SelectionChange::Unchanged);

        state.select(a);
        assert_eq!(state.on_despawned(b), SelectionChange::Unchanged);
        assert_eq!(state.on_despawned(a), SelectionChange::Deselected(a));
        assert_eq!(state.selected(), None);
    }
}
