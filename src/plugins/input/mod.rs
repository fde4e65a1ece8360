//! Input plugin: raw keyboard messages -> game controls.
//!
//! Pipeline:
//! - PreUpdate: translate `KeyboardInput` into [`ControlInput`] messages
//! - FixedUpdate (SimSet::Input): ability/attack systems read `ControlInput`
//! - Update: start/restart and mute read `ControlInput` outside the simulation gate
//!
//! Bindings are a pure function ([`bind`]) so tests can write `ControlInput`
//! directly without a window.

use bevy::ecs::message::{MessageReader, MessageWriter};
use bevy::input::ButtonState;
use bevy::input::keyboard::KeyboardInput;
use bevy::prelude::*;

use crate::plugins::bus::{BusEvent, PublishExt};
use crate::plugins::core::SoundSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlKey {
    Boost,
    Fire,
    Start,
    Mute,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAction {
    Down,
    Up,
}

#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlInput {
    pub key: ControlKey,
    pub action: KeyAction,
    /// OS auto-repeat of a held key.
    pub repeat: bool,
}

impl ControlInput {
    pub fn down(key: ControlKey) -> Self {
        Self { key, action: KeyAction::Down, repeat: false }
    }

    pub fn up(key: ControlKey) -> Self {
        Self { key, action: KeyAction::Up, repeat: false }
    }

    /// A fresh press, not an auto-repeat.
    #[inline]
    pub fn is_press(&self, key: ControlKey) -> bool {
        self.key == key && self.action == KeyAction::Down && !self.repeat
    }
}

/// Activation (Space) and attack (Enter) are distinct keys.
pub fn bind(code: KeyCode) -> Option<ControlKey> {
    match code {
        KeyCode::Space => Some(ControlKey::Boost),
        KeyCode::Enter | KeyCode::NumpadEnter => Some(ControlKey::Fire),
        KeyCode::KeyP => Some(ControlKey::Start),
        KeyCode::KeyM => Some(ControlKey::Mute),
        _ => None,
    }
}

pub fn plugin(app: &mut App) {
    // Registered here too so headless apps without InputPlugin can still feed keys.
    app.add_message::<KeyboardInput>()
        .add_message::<ControlInput>()
        .add_systems(PreUpdate, translate_keyboard)
        .add_systems(Update, toggle_sound);
}

fn translate_keyboard(
    mut keys: MessageReader<KeyboardInput>,
    mut out: MessageWriter<ControlInput>,
) {
    for ev in keys.read() {
        let Some(key) = bind(ev.key_code) else {
            continue;
        };
        let action = match ev.state {
            ButtonState::Pressed => KeyAction::Down,
            ButtonState::Released => KeyAction::Up,
        };
        out.write(ControlInput { key, action, repeat: ev.repeat });
    }
}

fn toggle_sound(
    mut commands: Commands,
    mut controls: MessageReader<ControlInput>,
    sound: Res<SoundSettings>,
) {
    let presses = controls.read().filter(|c| c.is_press(ControlKey::Mute)).count();
    if presses % 2 == 1 {
        commands.publish(BusEvent::SoundToggle(!sound.enabled));
    }
}
