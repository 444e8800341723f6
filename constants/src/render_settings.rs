use bevy::color::Color;

/// Manipulator handle length as a fraction of the camera distance to the target.
pub const MANIPULATOR_SCREEN_FRACTION: f32 = 0.15;

/// Pick tolerance around a manipulator handle, relative to the handle length.
pub const MANIPULATOR_PICK_TOLERANCE: f32 = 0.08;

/// Radians of rotation per pixel of horizontal drag in rotate mode.
pub const MANIPULATOR_ROTATE_SPEED: f32 = 0.01;

/// Smallest scale the manipulator will write.
pub const MANIPULATOR_MIN_SCALE: f32 = 0.001;

pub const AXIS_X_COLOUR: Color = Color::srgb(0.95, 0.25, 0.25);
pub const AXIS_Y_COLOUR: Color = Color::srgb(0.25, 0.9, 0.3);
pub const AXIS_Z_COLOUR: Color = Color::srgb(0.25, 0.45, 0.95);
pub const AXIS_ACTIVE_COLOUR: Color = Color::srgb(1.0, 0.9, 0.1);

/// Light helper colours (key, fill, back).
pub const KEY_LIGHT_HELPER_COLOUR: Color = Color::srgb(1.0, 0.0, 0.0);
pub const FILL_LIGHT_HELPER_COLOUR: Color = Color::srgb(0.0, 1.0, 0.0);
pub const BACK_LIGHT_HELPER_COLOUR: Color = Color::srgb(0.0, 0.0, 1.0);

/// Half-size of the pickable box drawn for each light helper.
pub const LIGHT_HELPER_HALF_SIZE: f32 = 1.0;

/// Selection outline colour.
pub const SELECTION_OUTLINE_COLOUR: Color = Color::srgb(1.0, 1.0, 0.0);

/// Cursor travel (pixels) beyond which a press becomes a drag instead of a click.
pub const CLICK_DRAG_THRESHOLD_PX: f32 = 4.0;
