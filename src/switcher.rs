//! Team switcher: picks the active team or opens the creation flow.

use crate::client::Navigator;
use crate::state::{reconcile_active_team, ActiveTeamStore, KeyValueStore, CREATE_TEAM_SENTINEL};
use crate::types::Team;

/// What a selection resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// The active team changed and was persisted.
    Switched(i64),
    /// The sentinel was chosen; open the creation dialog, no switch.
    CreateNew,
    /// The value was not a team the viewer belongs to; nothing happened.
    Ignored,
}

/// View-model for the team picker.
///
/// On construction the stored id is reconciled against the teams the
/// viewer currently belongs to; a stale or absent id falls back to the
/// first team in the list.
pub struct TeamSwitcher<S, N> {
    teams: Vec<Team>,
    active: Option<i64>,
    store: ActiveTeamStore<S>,
    nav: N,
}

impl<S: KeyValueStore, N: Navigator> TeamSwitcher<S, N> {
    pub fn new(teams: Vec<Team>, store: S, nav: N) -> Self {
        let store = ActiveTeamStore::new(store);
        let active = reconcile_active_team(store.get(), &teams);
        Self {
            teams,
            active,
            store,
            nav,
        }
    }

    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    /// With no teams the picker is replaced by a create-team affordance.
    pub fn has_teams(&self) -> bool {
        !self.teams.is_empty()
    }

    pub fn active_team(&self) -> Option<&Team> {
        self.active
            .and_then(|id| self.teams.iter().find(|t| t.id == id))
    }

    /// Handles a picker selection: a real id is persisted and the view
    /// refreshed; the sentinel opens the creation flow instead.
    pub fn select(&mut self, value: &str) -> Selection {
        if value == CREATE_TEAM_SENTINEL {
            return Selection::CreateNew;
        }

        let Ok(id) = value.parse::<i64>() else {
            return Selection::Ignored;
        };
        if !self.teams.iter().any(|t| t.id == id) {
            return Selection::Ignored;
        }

        self.store.set(id);
        self.active = Some(id);
        self.nav.refresh();
        Selection::Switched(id)
    }
}
