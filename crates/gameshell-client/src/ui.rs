//! Pause-menu overlay for the GameShell client.
//!
//! While `ShellState::Paused`, a full-viewport dim layer with a centered card
//! sits above everything else and the overlay controller is mounted. Leaving
//! `Paused` despawns the tree and drops the controller, which releases its
//! cancellation binding.
//!
//! | System | Schedule | Purpose |
//! |--------|----------|---------|
//! | `setup_hud` | `Startup` | Camera and hint line |
//! | `setup_pause_menu` | `OnEnter(Paused)` | Spawn overlay, mount controller, freeze virtual time |
//! | `cleanup_pause_menu` | `OnExit(Paused)` | Despawn overlay, unmount controller, resume time |
//! | `route_keyboard` | `Update` | Open key while `Playing` → `Paused`, every press → registry |
//! | `pause_menu_buttons` | `Update / in Paused` | Button presses → `MountedOverlay::select` |
//! | `apply_overlay_actions` | `Update` | Resume → `Playing`, Settings → log, Quit → `AppExit` |

use bevy::prelude::*;
use gameshell_logic::overlay::MenuAction;

use crate::input::route_keyboard;
use crate::state::{
    ActionOutbox, ActivePauseMenu, HudText, PauseMenuButton, PauseMenuRoot, ShellConfig,
    ShellInput, ShellState,
};

pub struct PauseMenuPlugin;

impl Plugin for PauseMenuPlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<ShellState>()
            .init_resource::<ShellConfig>()
            .init_resource::<ShellInput>()
            .init_resource::<ActivePauseMenu>()
            .init_resource::<ActionOutbox>()
            .add_systems(OnEnter(ShellState::Paused), setup_pause_menu)
            .add_systems(OnExit(ShellState::Paused), cleanup_pause_menu)
            .add_systems(
                Update,
                (
                    route_keyboard,
                    pause_menu_buttons.run_if(in_state(ShellState::Paused)),
                    apply_overlay_actions,
                )
                    .chain(),
            );
    }
}

fn button_label(action: MenuAction) -> &'static str {
    match action {
        MenuAction::Resume => "RESUME",
        MenuAction::Settings => "SETTINGS",
        MenuAction::Quit => "QUIT",
    }
}

fn button_text_color(action: MenuAction) -> Color {
    match action {
        MenuAction::Quit => Color::srgb(1.0, 0.55, 0.55),
        _ => Color::srgb(0.85, 0.85, 0.95),
    }
}

pub fn setup_hud(mut commands: Commands, config: Res<ShellConfig>) {
    commands.spawn(Camera2d);

    commands.spawn((
        Text::new(format!("[{}] Pause", config.0.open_key)),
        TextFont {
            font_size: 14.0,
            ..default()
        },
        TextColor(Color::srgb(0.6, 0.6, 0.6)),
        Node {
            position_type: PositionType::Absolute,
            left: Val::Px(10.0),
            top: Val::Px(10.0),
            ..default()
        },
        HudText,
    ));
}

pub fn setup_pause_menu(
    mut commands: Commands,
    input: Res<ShellInput>,
    config: Res<ShellConfig>,
    outbox: Res<ActionOutbox>,
    mut active: ResMut<ActivePauseMenu>,
    mut time: ResMut<Time<Virtual>>,
) {
    // Full-screen dim layer, blocks clicks to anything beneath
    commands
        .spawn((
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                position_type: PositionType::Absolute,
                left: Val::Px(0.0),
                top: Val::Px(0.0),
                ..default()
            },
            BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.7)),
            bevy::ui::FocusPolicy::Block,
            ZIndex(200),
            PauseMenuRoot,
        ))
        .with_children(|overlay| {
            overlay
                .spawn((
                    Node {
                        flex_direction: FlexDirection::Column,
                        align_items: AlignItems::Center,
                        padding: UiRect::all(Val::Px(36.0)),
                        row_gap: Val::Px(14.0),
                        border: UiRect::all(Val::Px(2.0)),
                        min_width: Val::Px(280.0),
                        ..default()
                    },
                    BackgroundColor(Color::srgb(0.04, 0.04, 0.07)),
                    BorderColor(Color::srgb(0.3, 0.3, 0.46)),
                ))
                .with_children(|card| {
                    for action in MenuAction::ALL {
                        card.spawn((
                            Button,
                            Node {
                                width: Val::Px(220.0),
                                height: Val::Px(48.0),
                                justify_content: JustifyContent::Center,
                                align_items: AlignItems::Center,
                                border: UiRect::all(Val::Px(2.0)),
                                ..default()
                            },
                            BackgroundColor(Color::srgb(0.1, 0.1, 0.16)),
                            BorderColor(button_text_color(action)),
                            PauseMenuButton(action),
                        ))
                        .with_children(|btn| {
                            btn.spawn((
                                Text::new(button_label(action)),
                                TextFont {
                                    font_size: 18.0,
                                    ..default()
                                },
                                TextColor(button_text_color(action)),
                            ));
                        });
                    }
                });
        });

    if active.0.is_some() {
        warn!("pause overlay already mounted, keeping existing binding");
    } else {
        let overlay = config.0.overlay();
        active.0 = Some(overlay.mount(&input.0, outbox.actions()));
    }
    time.pause();
}

pub fn cleanup_pause_menu(
    mut commands: Commands,
    query: Query<Entity, With<PauseMenuRoot>>,
    mut active: ResMut<ActivePauseMenu>,
    mut time: ResMut<Time<Virtual>>,
) {
    for entity in query.iter() {
        commands.entity(entity).despawn_recursive();
    }
    // Dropping the mounted overlay releases the cancellation binding.
    active.0 = None;
    time.unpause();
}

pub fn pause_menu_buttons(
    buttons: Query<(&Interaction, &PauseMenuButton, &Children), Changed<Interaction>>,
    mut btn_text: Query<&mut TextColor>,
    active: Res<ActivePauseMenu>,
) {
    for (interaction, button, children) in buttons.iter() {
        let color = match interaction {
            Interaction::Pressed => {
                if let Some(mounted) = &active.0 {
                    mounted.select(button.0);
                }
                continue;
            }
            Interaction::Hovered => Color::WHITE,
            Interaction::None => button_text_color(button.0),
        };
        for child in children.iter() {
            if let Ok(mut text_color) = btn_text.get_mut(*child) {
                *text_color = TextColor(color);
            }
        }
    }
}

/// The overlay only signals; the host decides what each action means.
pub fn apply_overlay_actions(
    outbox: Res<ActionOutbox>,
    mut next_state: ResMut<NextState<ShellState>>,
    mut exit: EventWriter<AppExit>,
) {
    for action in outbox.drain() {
        match action {
            MenuAction::Resume => {
                info!("resume requested");
                next_state.set(ShellState::Playing);
            }
            MenuAction::Settings => {
                info!("settings requested");
            }
            MenuAction::Quit => {
                info!("quit requested, shutting down...");
                exit.send(AppExit::Success);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::input::keyboard::{Key, KeyboardInput, NativeKey};
    use bevy::input::{ButtonState, InputPlugin};
    use bevy::state::app::StatesPlugin;
    use gameshell_logic::config::OverlayConfig;
    use gameshell_logic::keys;

    fn test_app() -> App {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, StatesPlugin, InputPlugin, PauseMenuPlugin));
        app.update();
        app
    }

    fn open(app: &mut App) {
        app.world_mut()
            .resource_mut::<NextState<ShellState>>()
            .set(ShellState::Paused);
        app.update();
    }

    fn press(app: &mut App, key_code: KeyCode, repeat: bool) {
        app.world_mut().send_event(KeyboardInput {
            key_code,
            logical_key: Key::Unidentified(NativeKey::Unidentified),
            state: ButtonState::Pressed,
            repeat,
            window: Entity::PLACEHOLDER,
        });
        app.update();
    }

    fn state(app: &App) -> ShellState {
        *app.world().resource::<State<ShellState>>().get()
    }

    fn bindings(app: &App) -> usize {
        app.world()
            .resource::<ShellInput>()
            .0
            .binding_count(keys::ESCAPE)
    }

    fn overlay_roots(app: &mut App) -> usize {
        app.world_mut()
            .query_filtered::<Entity, With<PauseMenuRoot>>()
            .iter(app.world())
            .count()
    }

    #[test]
    fn starts_playing_without_binding() {
        let mut app = test_app();
        assert_eq!(state(&app), ShellState::Playing);
        assert_eq!(bindings(&app), 0);
        assert_eq!(overlay_roots(&mut app), 0);
    }

    #[test]
    fn pausing_mounts_overlay() {
        let mut app = test_app();
        open(&mut app);
        assert_eq!(state(&app), ShellState::Paused);
        assert_eq!(bindings(&app), 1);
        assert_eq!(overlay_roots(&mut app), 1);
        assert!(app.world().resource::<Time<Virtual>>().is_paused());
    }

    #[test]
    fn cancel_key_resumes_and_unbinds() {
        let mut app = test_app();
        open(&mut app);

        let input = app.world().resource::<ShellInput>().clone();
        assert_eq!(input.0.dispatch(keys::ESCAPE), 1);

        app.update(); // action applied, transition queued
        app.update(); // OnExit(Paused)
        assert_eq!(state(&app), ShellState::Playing);
        assert_eq!(bindings(&app), 0);
        assert_eq!(overlay_roots(&mut app), 0);
        assert_eq!(input.0.dispatch(keys::ESCAPE), 0);
    }

    #[test]
    fn reopening_binds_once() {
        let mut app = test_app();
        open(&mut app);
        app.world_mut()
            .resource_mut::<NextState<ShellState>>()
            .set(ShellState::Playing);
        app.update();
        open(&mut app);
        assert_eq!(bindings(&app), 1);
    }

    #[test]
    fn quit_selection_exits() {
        let mut app = test_app();
        open(&mut app);
        if let Some(mounted) = &app.world().resource::<ActivePauseMenu>().0 {
            mounted.select(MenuAction::Quit);
        }
        app.update();
        assert_eq!(app.should_exit(), Some(AppExit::Success));
        assert_eq!(state(&app), ShellState::Paused);
    }

    #[test]
    fn settings_selection_keeps_overlay_open() {
        let mut app = test_app();
        open(&mut app);
        if let Some(mounted) = &app.world().resource::<ActivePauseMenu>().0 {
            mounted.select(MenuAction::Settings);
        }
        app.update();
        app.update();
        assert_eq!(state(&app), ShellState::Paused);
        assert_eq!(bindings(&app), 1);
        assert_eq!(app.should_exit(), None);
    }

    #[test]
    fn escape_opens_then_cancels_without_reopening() {
        let mut app = test_app();

        press(&mut app, KeyCode::Escape, false); // transition queued
        app.update(); // OnEnter(Paused)
        assert_eq!(state(&app), ShellState::Paused);
        assert_eq!(bindings(&app), 1);

        press(&mut app, KeyCode::Escape, false); // resume, transition queued
        app.update(); // OnExit(Paused)
        assert_eq!(state(&app), ShellState::Playing);
        assert_eq!(bindings(&app), 0);

        for _ in 0..4 {
            app.update();
        }
        assert_eq!(state(&app), ShellState::Playing);
        assert_eq!(bindings(&app), 0);
        assert_eq!(overlay_roots(&mut app), 0);
    }

    #[test]
    fn other_keys_do_not_open() {
        let mut app = test_app();
        press(&mut app, KeyCode::KeyP, false);
        app.update();
        assert_eq!(state(&app), ShellState::Playing);
        assert_eq!(bindings(&app), 0);
    }

    #[test]
    fn held_key_repeats_ignored_by_default() {
        let mut app = test_app();
        press(&mut app, KeyCode::Escape, true);
        app.update();
        assert_eq!(state(&app), ShellState::Playing);
        assert_eq!(bindings(&app), 0);
    }

    #[test]
    fn held_key_repeats_count_when_allowed() {
        let mut app = test_app();
        app.insert_resource(ShellConfig(OverlayConfig {
            ignore_repeats: false,
            ..default()
        }));
        press(&mut app, KeyCode::Escape, true);
        app.update();
        assert_eq!(state(&app), ShellState::Paused);
        assert_eq!(bindings(&app), 1);
    }

    #[test]
    fn released_key_is_not_a_press() {
        let mut app = test_app();
        app.world_mut().send_event(KeyboardInput {
            key_code: KeyCode::Escape,
            logical_key: Key::Escape,
            state: ButtonState::Released,
            repeat: false,
            window: Entity::PLACEHOLDER,
        });
        app.update();
        app.update();
        assert_eq!(state(&app), ShellState::Playing);
    }
}
