/// Default key light position.
pub const KEY_LIGHT_POSITION: [f32; 3] = [10.0, 15.0, 10.0];
pub const KEY_LIGHT_ILLUMINANCE: f32 = 1500.0;

/// Default fill light position.
pub const FILL_LIGHT_POSITION: [f32; 3] = [-10.0, 5.0, 10.0];
pub const FILL_LIGHT_ILLUMINANCE: f32 = 400.0;

/// Default back light position.
pub const BACK_LIGHT_POSITION: [f32; 3] = [-5.0, 10.0, -15.0];
pub const BACK_LIGHT_ILLUMINANCE: f32 = 800.0;

/// Splat volumes are placed one unit above the origin by default.
pub const SPLAT_DEFAULT_POSITION: [f32; 3] = [0.0, 1.0, 0.0];

/// Half extents used to pick volumetric entities, which carry no mesh bounds.
pub const VOLUME_PICK_HALF_EXTENTS: [f32; 3] = [1.0, 1.0, 1.0];

/// Initial viewport camera position.
pub const CAMERA_START_POSITION: [f32; 3] = [20.0, 20.0, 20.0];

/// Orbit controller tuning.
pub const ORBIT_ROTATE_SPEED: f32 = 0.005;
pub const ORBIT_ZOOM_SPEED: f32 = 0.1;
pub const ORBIT_PAN_SPEED: f32 = 0.002;
pub const ORBIT_MIN_RADIUS: f32 = 0.2;
pub const ORBIT_MAX_RADIUS: f32 = 500.0;
pub const ORBIT_PITCH_LIMIT: f32 = 1.55;
