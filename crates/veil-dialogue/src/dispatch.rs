//! The effect dispatcher and its injected collaborator seams.
//!
//! Dispatch is infallible from the session's point of view: a rejected
//! quest command or an unhandled custom effect is logged and skipped so
//! the conversation keeps going.

use tracing::{debug, warn};

use veil_core::{CombatAction, Effect, ItemAction, QuestAction, SceneAction, WorldState};
use veil_quest::{QuestManager, QuestState};

/// Location and scripted-scene changes, owned by the wider engine.
pub trait SceneService {
    /// The player moved to another location.
    fn change_location(&mut self, location_id: &str) {
        let _ = location_id;
    }

    /// A scripted scene was requested.
    fn change_scene(&mut self, scene_id: &str) {
        let _ = scene_id;
    }
}

/// Combat hand-off, owned by the wider engine.
pub trait CombatService {
    /// Combat with the named enemy begins.
    fn start_combat(&mut self, enemy_id: &str) {
        let _ = enemy_id;
    }

    /// The current combat ends.
    fn end_combat(&mut self) {}
}

/// Sink for presentation-only messages that bypass the quest queue.
pub trait Notifier {
    /// Show a message to the player.
    fn notify(&mut self, text: &str) {
        let _ = text;
    }
}

/// Hook for engine-defined effects this core knows nothing about.
pub trait CustomEffectHook {
    /// Handle a custom effect. Return false to have it logged as unhandled.
    fn apply(&mut self, name: &str, payload: &serde_json::Value) -> bool {
        let _ = (name, payload);
        false
    }
}

/// A collaborator that ignores everything it is told.
#[derive(Debug, Clone, Copy, Default)]
pub struct InertCollaborator;

impl SceneService for InertCollaborator {}
impl CombatService for InertCollaborator {}
impl Notifier for InertCollaborator {}
impl CustomEffectHook for InertCollaborator {}

/// Routes tagged effects to the quest machine, the world state, and the
/// injected collaborators.
pub struct EffectDispatcher {
    quests: QuestManager,
    scene: Box<dyn SceneService>,
    combat: Box<dyn CombatService>,
    notifier: Box<dyn Notifier>,
    custom: Box<dyn CustomEffectHook>,
}

impl EffectDispatcher {
    /// Create a dispatcher with inert collaborators.
    pub fn new(quests: QuestManager) -> Self {
        Self {
            quests,
            scene: Box::new(InertCollaborator),
            combat: Box::new(InertCollaborator),
            notifier: Box::new(InertCollaborator),
            custom: Box::new(InertCollaborator),
        }
    }

    /// Inject a scene collaborator.
    pub fn with_scene_service(mut self, scene: Box<dyn SceneService>) -> Self {
        self.scene = scene;
        self
    }

    /// Inject a combat collaborator.
    pub fn with_combat_service(mut self, combat: Box<dyn CombatService>) -> Self {
        self.combat = combat;
        self
    }

    /// Inject a notifier.
    pub fn with_notifier(mut self, notifier: Box<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Inject a custom-effect hook.
    pub fn with_custom_hook(mut self, custom: Box<dyn CustomEffectHook>) -> Self {
        self.custom = custom;
        self
    }

    /// The quest manager behind the dispatcher.
    pub fn quests(&self) -> &QuestManager {
        &self.quests
    }

    /// Mutable access to the quest manager, for polling notifications.
    pub fn quests_mut(&mut self) -> &mut QuestManager {
        &mut self.quests
    }

    /// Apply one effect. Never fails; rejections are logged and skipped.
    pub fn apply(&mut self, effect: &Effect, world: &mut WorldState, quests: &mut QuestState) {
        match effect {
            Effect::Quest { quest_id, action } => self.apply_quest(quest_id, action, world, quests),
            Effect::Relationship { npc_id, delta } => {
                world.modify_relationship(npc_id.clone(), *delta);
            }
            Effect::Item { item_id, action } => match action {
                ItemAction::Add => world.add_item(item_id.clone()),
                ItemAction::Remove => {
                    if !world.remove_item(item_id) {
                        debug!(item_id = %item_id, "removing an item that is not held");
                    }
                }
            },
            Effect::Skill { name, delta } => world.modify_skill(name.clone(), *delta),
            Effect::Stat { name, delta } => world.modify_stat(name.clone(), *delta),
            Effect::Flag { name, value } => world.set_flag(name.clone(), value.clone()),
            Effect::Notification { text } => self.notifier.notify(text),
            Effect::Scene(action) => match action {
                SceneAction::ChangeLocation { location_id } => {
                    world.change_location(location_id.clone());
                    self.scene.change_location(location_id);
                }
                SceneAction::ChangeScene { scene_id } => self.scene.change_scene(scene_id),
            },
            Effect::Combat(action) => match action {
                CombatAction::Start { enemy_id } => self.combat.start_combat(enemy_id),
                CombatAction::End => self.combat.end_combat(),
            },
            Effect::Custom { name, payload } => {
                if !self.custom.apply(name, payload) {
                    warn!(name = %name, "unhandled custom effect");
                }
            }
        }
    }

    /// Apply every effect in a list, in declaration order.
    pub fn apply_all(&mut self, effects: &[Effect], world: &mut WorldState, quests: &mut QuestState) {
        for effect in effects {
            self.apply(effect, world, quests);
        }
    }

    fn apply_quest(
        &mut self,
        quest_id: &str,
        action: &QuestAction,
        world: &mut WorldState,
        quests: &mut QuestState,
    ) {
        let result = match action {
            QuestAction::Add => self.quests.add_quest(quest_id, quests),
            QuestAction::Start => self.quests.start_quest(quest_id, quests),
            QuestAction::Advance { stage_id } => self.quests.advance_stage(quest_id, stage_id, quests),
            QuestAction::CompleteObjective { objective_id } => self
                .quests
                .complete_objective(quest_id, objective_id, quests)
                .map(|events| {
                    // Completion events run through the same dispatcher
                    self.apply_all(&events, world, quests);
                }),
            QuestAction::Fail => self.quests.fail_quest(quest_id, quests),
            QuestAction::UnlockBranch { branch_id } => {
                self.quests.unlock_branch(quest_id, branch_id, quests)
            }
        };

        if let Err(err) = result {
            warn!(quest_id = %quest_id, error = %err, "quest effect rejected");
            return;
        }

        for report in self.quests.check_all_updates(quests) {
            debug!(
                quest_id = %report.quest_id,
                stage_complete = report.stage_complete,
                quest_complete = report.quest_complete,
                "quest progress re-evaluated"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    use veil_core::{CombatAction, FlagValue};
    use veil_quest::{Objective, Quest, QuestCatalog, QuestStage, QuestStatus};

    fn catalog() -> QuestCatalog {
        QuestCatalog::new().with_quest(
            Quest::new("hanged_man", "The Hanged Man")
                .with_stage(
                    QuestStage::new("s1", "The Body").with_objective(
                        Objective::new("a", "Inspect the body").with_completion_event(
                            Effect::Item {
                                item_id: "ledger".to_string(),
                                action: ItemAction::Add,
                            },
                        ),
                    ),
                )
                .with_stage(
                    QuestStage::new("s2", "Witnesses")
                        .with_objective(Objective::new("b", "Question witnesses")),
                ),
        )
    }

    fn setup() -> (EffectDispatcher, WorldState, QuestState) {
        (
            EffectDispatcher::new(QuestManager::new(catalog())),
            WorldState::new(),
            QuestState::new(),
        )
    }

    fn quest_effect(action: QuestAction) -> Effect {
        Effect::Quest {
            quest_id: "hanged_man".to_string(),
            action,
        }
    }

    #[test]
    fn world_effects_mutate_state() {
        let (mut dispatcher, mut world, mut quests) = setup();

        dispatcher.apply_all(
            &[
                Effect::Relationship {
                    npc_id: "kim".to_string(),
                    delta: 2,
                },
                Effect::Skill {
                    name: "empathy".to_string(),
                    delta: 1,
                },
                Effect::Stat {
                    name: "morale".to_string(),
                    delta: -1,
                },
                Effect::Flag {
                    name: "door_open".to_string(),
                    value: FlagValue::Bool(true),
                },
                Effect::Item {
                    item_id: "flashlight".to_string(),
                    action: ItemAction::Add,
                },
            ],
            &mut world,
            &mut quests,
        );

        assert_eq!(world.relationship("kim"), 2);
        assert_eq!(world.skill("empathy"), 1);
        assert_eq!(world.stat("morale"), -1);
        assert_eq!(world.flag("door_open"), Some(&FlagValue::Bool(true)));
        assert!(world.has_item("flashlight"));
    }

    #[test]
    fn quest_effects_drive_the_state_machine() {
        let (mut dispatcher, mut world, mut quests) = setup();

        dispatcher.apply(&quest_effect(QuestAction::Start), &mut world, &mut quests);
        assert_eq!(quests.status("hanged_man"), Some(QuestStatus::InProgress));

        dispatcher.apply(
            &quest_effect(QuestAction::CompleteObjective {
                objective_id: "a".to_string(),
            }),
            &mut world,
            &mut quests,
        );
        assert!(quests.is_objective_completed("hanged_man", "a"));
        // The objective's completion event went through the dispatcher too
        assert!(world.has_item("ledger"));
    }

    #[test]
    fn rejected_quest_effect_is_swallowed() {
        let (mut dispatcher, mut world, mut quests) = setup();

        // Completing an objective on a quest that was never started
        dispatcher.apply(
            &quest_effect(QuestAction::CompleteObjective {
                objective_id: "a".to_string(),
            }),
            &mut world,
            &mut quests,
        );
        assert!(!quests.is_objective_completed("hanged_man", "a"));

        // Later effects in the same list still apply
        dispatcher.apply_all(
            &[
                quest_effect(QuestAction::Advance {
                    stage_id: "s2".to_string(),
                }),
                Effect::Skill {
                    name: "logic".to_string(),
                    delta: 1,
                },
            ],
            &mut world,
            &mut quests,
        );
        assert_eq!(world.skill("logic"), 1);
    }

    #[test]
    fn scene_change_updates_location_and_delegates() {
        #[derive(Default)]
        struct RecordingScene {
            log: Rc<RefCell<Vec<String>>>,
        }
        impl SceneService for RecordingScene {
            fn change_location(&mut self, location_id: &str) {
                self.log.borrow_mut().push(location_id.to_string());
            }
        }

        let log = Rc::new(RefCell::new(Vec::new()));
        let (dispatcher, mut world, mut quests) = setup();
        let mut dispatcher =
            dispatcher.with_scene_service(Box::new(RecordingScene { log: Rc::clone(&log) }));

        dispatcher.apply(
            &Effect::Scene(SceneAction::ChangeLocation {
                location_id: "backyard".to_string(),
            }),
            &mut world,
            &mut quests,
        );

        assert_eq!(world.current_location(), "backyard");
        assert_eq!(*log.borrow(), vec!["backyard".to_string()]);
    }

    #[test]
    fn notifier_receives_presentation_messages() {
        struct RecordingNotifier {
            messages: Rc<RefCell<Vec<String>>>,
        }
        impl Notifier for RecordingNotifier {
            fn notify(&mut self, text: &str) {
                self.messages.borrow_mut().push(text.to_string());
            }
        }

        let messages = Rc::new(RefCell::new(Vec::new()));
        let (dispatcher, mut world, mut quests) = setup();
        let mut dispatcher = dispatcher.with_notifier(Box::new(RecordingNotifier {
            messages: Rc::clone(&messages),
        }));

        dispatcher.apply(
            &Effect::Notification {
                text: "You feel watched.".to_string(),
            },
            &mut world,
            &mut quests,
        );
        assert_eq!(*messages.borrow(), vec!["You feel watched.".to_string()]);
        // Presentation messages bypass the quest queue
        assert!(dispatcher.quests().notifications().is_empty());
    }

    #[test]
    fn combat_and_custom_effects_do_not_disturb_state() {
        let (mut dispatcher, mut world, mut quests) = setup();

        dispatcher.apply(
            &Effect::Combat(CombatAction::Start {
                enemy_id: "measurehead".to_string(),
            }),
            &mut world,
            &mut quests,
        );
        dispatcher.apply(
            &Effect::Custom {
                name: "play_jingle".to_string(),
                payload: serde_json::json!({"track": "sad_detective"}),
            },
            &mut world,
            &mut quests,
        );

        assert!(quests.is_empty());
        assert!(!world.has_item("measurehead"));
    }
}
