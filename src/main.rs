use bevy::prelude::AppExit;

fn main() -> AppExit {
    bevy_dodge::game::run()
}
