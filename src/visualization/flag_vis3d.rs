use bevy::prelude::*;
use bevy::math::primitives::Sphere;
use bevy::render::mesh::{Indices, PrimitiveTopology};
use bevy::render::render_asset::RenderAssetUsages;

use crate::simulation::scenario::Scenario;

/// Component tagging each particle sphere with its id in Scenario.system
#[derive(Component)]
struct ParticleIndex(pub usize);

/// Handle of the deformable cloth mesh, rewritten every frame
#[derive(Resource)]
struct ClothMeshHandle(Handle<Mesh>);

/// Distance of the camera from the cloth center along +Z
const CAMERA_DISTANCE: f32 = 2.5;

/// Minimum visual radius for particle spheres
const MIN_PARTICLE_RADIUS: f32 = 0.005;

pub fn run_3d(scenario: Scenario) {
    App::new()
        .insert_resource(scenario)
        .add_plugins(DefaultPlugins)
        .add_systems(Startup, setup_3d)
        .add_systems(Update, (keyboard_controls, physics_step_3d, sync_cloth_mesh, sync_particles).chain())
        .run();
}

/// Startup system: spawn camera, lights, the cloth surface and optional particle spheres
fn setup_3d(mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    asset_server: Res<AssetServer>,
    scenario: Res<Scenario>,
) {
    info!(
        "run_3d: {}x{} cloth, {} particles (space: start/stop, W: wind, up/down: dt)",
        scenario.cloth.horizontal_resolution,
        scenario.cloth.vertical_resolution,
        scenario.system.particle_count(),
    );

    let positions = scenario.cloth.positions(&scenario.system);
    let center = positions
        .iter()
        .fold(Vec3::ZERO, |acc, p| acc + Vec3::from_array(*p))
        / positions.len().max(1) as f32;

    commands.spawn(Camera3dBundle {
        camera: Camera {
            clear_color: ClearColorConfig::Custom(Color::srgb(0.8, 0.8, 0.8)),
            ..Default::default()
        },
        transform: Transform::from_xyz(center.x + 0.6, center.y + 0.4, center.z + CAMERA_DISTANCE)
            .looking_at(center, Vec3::Y),
        ..Default::default()
    });

    commands.spawn(DirectionalLightBundle {
        directional_light: DirectionalLight {
            illuminance: 8000.0,
            ..Default::default()
        },
        transform: Transform::from_xyz(1.0, 1.0, 1.0).looking_at(Vec3::ZERO, Vec3::Y),
        ..Default::default()
    });

    // =====================================================================
    // Cloth surface: positions change every frame, uv and indices never do
    let normals = scenario.cloth.normals(&positions);
    // Image rows run top to bottom, the fabric's j axis runs bottom to top
    let uvs: Vec<[f32; 2]> = scenario
        .cloth
        .texcoords
        .iter()
        .map(|[u, v]| [*u, 1.0 - *v])
        .collect();

    let mut mesh = Mesh::new(PrimitiveTopology::TriangleList, RenderAssetUsages::default());
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
    mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, normals);
    mesh.insert_attribute(Mesh::ATTRIBUTE_UV_0, uvs);
    mesh.insert_indices(Indices::U32(scenario.cloth.indices()));
    let mesh_handle = meshes.add(mesh);

    let texture = scenario
        .viewer
        .texture
        .clone()
        .map(|path| asset_server.load::<Image>(path));
    let base_color = if texture.is_some() {
        Color::WHITE
    } else {
        Color::srgb(0.8, 0.1, 0.1)
    };

    commands.spawn(PbrBundle {
        mesh: mesh_handle.clone(),
        material: materials.add(StandardMaterial {
            base_color,
            base_color_texture: texture,
            double_sided: true,
            cull_mode: None,
            ..Default::default()
        }),
        ..Default::default()
    });
    commands.insert_resource(ClothMeshHandle(mesh_handle));
    // =====================================================================

    if scenario.viewer.show_particles {
        spawn_particles(&mut commands, &mut meshes, &mut materials, &scenario);
    }
}

fn spawn_particles(commands: &mut Commands, meshes: &mut Assets<Mesh>, materials: &mut Assets<StandardMaterial>, scenario: &Scenario) {
    let free = materials.add(StandardMaterial {
        base_color: Color::srgb(1.0, 1.0, 1.0),
        unlit: true,
        ..Default::default()
    });
    let fixed = materials.add(StandardMaterial {
        base_color: Color::srgb(0.1, 0.1, 1.0),
        unlit: true,
        ..Default::default()
    });

    for (i, p) in scenario.system.particles().iter().enumerate() {
        let radius = (p.radius() as f32).max(MIN_PARTICLE_RADIUS);
        let x = p.position();
        commands.spawn((
            PbrBundle {
                mesh: meshes.add(Sphere::new(radius).mesh()),
                material: if p.is_fixed() { fixed.clone() } else { free.clone() },
                transform: Transform::from_xyz(x.x as f32, x.y as f32, x.z as f32),
                ..Default::default()
            },
            ParticleIndex(i),
        ));
    }
}

/// Space toggles the animation, W the wind field, arrows scale dt
fn keyboard_controls(keys: Res<ButtonInput<KeyCode>>, mut scenario: ResMut<Scenario>) {
    if keys.just_pressed(KeyCode::Space) {
        let running = scenario.engine.toggle();
        info!("animation {}", if running { "started" } else { "stopped" });
    }

    if keys.just_pressed(KeyCode::KeyW) {
        match scenario.toggle_wind() {
            Some(enabled) => info!("wind {}", if enabled { "on" } else { "off" }),
            None => info!("scenario has no wind"),
        }
    }

    let factor = if keys.just_pressed(KeyCode::ArrowUp) {
        2.0
    } else if keys.just_pressed(KeyCode::ArrowDown) {
        0.5
    } else {
        return;
    };
    let dt = scenario.system.dt() * factor;
    match scenario.set_dt(dt) {
        Ok(()) => info!("dt = {dt:e}"),
        Err(e) => warn!("{e}"),
    }
}

/// Per-frame physics integration
fn physics_step_3d(mut scenario: ResMut<Scenario>) {
    let Scenario {
        engine,
        system,
        ..
    } = &mut *scenario;

    engine.advance(system);
}

/// Copy the position snapshot into the cloth vertex buffer
fn sync_cloth_mesh(
    scenario: Res<Scenario>,
    handle: Res<ClothMeshHandle>,
    mut meshes: ResMut<Assets<Mesh>>,
) {
    if !scenario.engine.running {
        return;
    }
    if let Some(mesh) = meshes.get_mut(&handle.0) {
        let positions = scenario.cloth.positions(&scenario.system);
        let normals = scenario.cloth.normals(&positions);
        mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
        mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, normals);
    }
}

fn sync_particles(
    scenario: Res<Scenario>,
    mut query: Query<(&ParticleIndex, &mut Transform)>,
) {
    if !scenario.engine.running {
        return;
    }
    for (ParticleIndex(i), mut transform) in &mut query {
        if let Some(p) = scenario.system.particle(*i) {
            let x = p.position();
            transform.translation = Vec3::new(x.x as f32, x.y as f32, x.z as f32);
        }
    }
}
