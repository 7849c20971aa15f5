use crate::outbox::Outbox;
use crate::spawns::SpawnSelector;
use arena_core::{ActorId, Team, TeamConfig, WorldCommand};

const TEAM_A_COLOR: &str = "#9b2021";
const TEAM_B_COLOR: &str = "#0000d8";

fn validate_color(color: &str, team: Team) -> String {
    if color.len() == 6 && color.chars().all(|c| c.is_ascii_hexdigit()) {
        format!("#{color}")
    } else if team == Team::B {
        TEAM_B_COLOR.to_string()
    } else {
        TEAM_A_COLOR.to_string()
    }
}

/// One side of a team match: color, clothing, spawn pool and the mirrored
/// native team-group membership. The group handle is created lazily on
/// first use and must be fully torn down on destroy.
pub struct TeamRoster {
    pub team: Team,
    pub display_name: String,
    pub color: String,
    pub clothing_kit: String,
    pub spawns: SpawnSelector,
    group: Option<u64>,
    members: Vec<ActorId>,
}

impl TeamRoster {
    pub fn new(team: Team, config: &TeamConfig, default_name: &str, spawns: SpawnSelector) -> Self {
        let display_name = if config.name.is_empty() {
            default_name.to_string()
        } else {
            config.name.clone()
        };

        Self {
            team,
            display_name,
            color: validate_color(&config.color, team),
            clothing_kit: config.clothing_kit.clone(),
            spawns,
            group: None,
            members: Vec::new(),
        }
    }

    pub fn members(&self) -> &[ActorId] {
        &self.members
    }

    pub fn contains(&self, actor: ActorId) -> bool {
        self.members.contains(&actor)
    }

    pub fn is_group(&self, group: u64) -> bool {
        self.group == Some(group)
    }

    fn ensure_group(&mut self, next_group: &mut dyn FnMut() -> u64, out: &mut Outbox) -> u64 {
        match self.group {
            Some(group) => group,
            None => {
                let group = next_group();
                out.command(WorldCommand::CreateTeamGroup {
                    group,
                    name: self.display_name.clone(),
                });
                self.group = Some(group);
                group
            }
        }
    }

    /// Add an actor, first detaching them from whatever native grouping
    /// they arrived with.
    pub fn add(&mut self, actor: ActorId, next_group: &mut dyn FnMut() -> u64, out: &mut Outbox) {
        let group = self.ensure_group(next_group, out);

        out.command(WorldCommand::DetachFromForeignGroup { actor });

        if !self.members.contains(&actor) {
            self.members.push(actor);
        }
        out.command(WorldCommand::AddToTeamGroup { group, actor });
    }

    /// Remove an actor's membership. A no-op for non-members.
    pub fn remove(&mut self, actor: ActorId, out: &mut Outbox) {
        let Some(index) = self.members.iter().position(|m| *m == actor) else {
            return;
        };
        self.members.remove(index);

        if let Some(group) = self.group {
            out.command(WorldCommand::RemoveFromTeamGroup { group, actor });
        }
    }

    /// Tear down every membership and the native group handle so no actor
    /// is left referencing a destroyed team.
    pub fn destroy(&mut self, out: &mut Outbox) {
        if let Some(group) = self.group.take() {
            for index in (0..self.members.len()).rev() {
                let actor = self.members[index];
                out.command(WorldCommand::RemoveFromTeamGroup { group, actor });
            }
            out.command(WorldCommand::DisbandTeamGroup { group });
        }

        self.members.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster(color: &str) -> TeamRoster {
        let config = TeamConfig {
            color: color.into(),
            ..Default::default()
        };
        TeamRoster::new(Team::A, &config, "Team A", SpawnSelector::empty())
    }

    fn next_group_counter(counter: &mut u64) -> impl FnMut() -> u64 + '_ {
        move || {
            *counter += 1;
            *counter
        }
    }

    #[test]
    fn invalid_colors_fall_back_to_side_default() {
        assert_eq!(roster("zzz").color, TEAM_A_COLOR);
        assert_eq!(roster("12345").color, TEAM_A_COLOR);
        assert_eq!(roster("a1b2c3").color, "#a1b2c3");
    }

    #[test]
    fn group_is_created_lazily_and_once() {
        let mut counter = 0;
        let mut next = next_group_counter(&mut counter);
        let mut out = Outbox::default();
        let mut team = roster("");

        team.add(ActorId(1), &mut next, &mut out);
        team.add(ActorId(2), &mut next, &mut out);

        let created = out
            .commands
            .iter()
            .filter(|c| matches!(c, WorldCommand::CreateTeamGroup { .. }))
            .count();
        assert_eq!(created, 1);
    }

    #[test]
    fn destroy_clears_members_and_disbands() {
        let mut counter = 0;
        let mut next = next_group_counter(&mut counter);
        let mut out = Outbox::default();
        let mut team = roster("");

        team.add(ActorId(1), &mut next, &mut out);
        team.add(ActorId(2), &mut next, &mut out);

        let mut out = Outbox::default();
        team.destroy(&mut out);

        assert!(team.members().is_empty());
        assert!(!team.is_group(1));
        let removals = out
            .commands
            .iter()
            .filter(|c| matches!(c, WorldCommand::RemoveFromTeamGroup { .. }))
            .count();
        assert_eq!(removals, 2);
        assert!(out
            .commands
            .iter()
            .any(|c| matches!(c, WorldCommand::DisbandTeamGroup { group: 1 })));
    }

    #[test]
    fn remove_without_membership_is_a_no_op() {
        let mut out = Outbox::default();
        let mut team = roster("");
        team.remove(ActorId(9), &mut out);
        assert!(out.commands.is_empty());
    }
}
