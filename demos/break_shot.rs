use billiard_physics::{
    Ball, BallId, Collision, Cushion, CushionId, PhysicsParams, Pocket, PocketId, Shot, Table,
    Vector3,
};
use log::info;

const LENGTH: f64 = 2.54;
const WIDTH: f64 = 1.27;
const RAIL: f64 = 0.05;
const GAP: f64 = 0.08;
const POCKET_RADIUS: f64 = 0.06;
const FRAME: f64 = 1.0 / 120.0;

fn rail(id: u32, min: (f64, f64), max: (f64, f64)) -> billiard_physics::Result<Cushion> {
    Cushion::new(
        CushionId(id),
        [
            Vector3::new(min.0, min.1, 0.0),
            Vector3::new(max.0, min.1, 0.0),
            Vector3::new(max.0, max.1, 0.0),
            Vector3::new(min.0, max.1, 0.0),
        ],
    )
}

fn build_table(params: &PhysicsParams) -> billiard_physics::Result<Table> {
    let mut table = Table::new(params.clone())?;
    let half = LENGTH / 2.0;

    // Six rails with gaps at the pockets
    table.add_cushion(rail(0, (GAP, -RAIL), (half - GAP, 0.0))?)?;
    table.add_cushion(rail(1, (half + GAP, -RAIL), (LENGTH - GAP, 0.0))?)?;
    table.add_cushion(rail(2, (GAP, WIDTH), (half - GAP, WIDTH + RAIL))?)?;
    table.add_cushion(rail(3, (half + GAP, WIDTH), (LENGTH - GAP, WIDTH + RAIL))?)?;
    table.add_cushion(rail(4, (-RAIL, GAP), (0.0, WIDTH - GAP))?)?;
    table.add_cushion(rail(5, (LENGTH, GAP), (LENGTH + RAIL, WIDTH - GAP))?)?;

    let mouths = [
        (0.0, 0.0),
        (half, 0.0),
        (LENGTH, 0.0),
        (0.0, WIDTH),
        (half, WIDTH),
        (LENGTH, WIDTH),
    ];
    for (i, (x, y)) in mouths.into_iter().enumerate() {
        table.add_pocket(Pocket::new(PocketId(i as u32), x, y, POCKET_RADIUS, 0.1)?)?;
    }

    table.add_ball(Ball::with_params(BallId(0), LENGTH * 0.25, WIDTH / 2.0, params))?;

    // Fifteen object balls in a triangle with its apex on the foot spot
    let r = params.ball_radius;
    let row_step = 2.0 * r * 3.0f64.sqrt() / 2.0 + 1e-4;
    let mut id = 1;
    for row in 0..5 {
        for slot in 0..=row {
            let x = LENGTH * 0.75 + row as f64 * row_step;
            let y = WIDTH / 2.0 + (slot as f64 - row as f64 / 2.0) * (2.0 * r + 1e-4);
            table.add_ball(Ball::with_params(BallId(id), x, y, params))?;
            id += 1;
        }
    }
    Ok(table)
}

fn describe(collision: &Collision) -> String {
    match collision {
        Collision::BallBall { first, second, impulse, .. } => {
            format!("{} hits {} (impulse {:.3})", first, second, impulse)
        }
        Collision::BallCushion { ball, cushion, impulse, .. } => {
            format!("{} bounces off {} (impulse {:.3})", ball, cushion, impulse)
        }
        Collision::BallPocket { ball, pocket, .. } => format!("{} drops into {}", ball, pocket),
    }
}

fn main() -> billiard_physics::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let params = PhysicsParams::default();
    let mut table = build_table(&params)?;

    table.strike(BallId(0), &Shot::new(Vector3::new(1.0, 0.01, 0.0), 7.0).with_top_spin(0.2))?;
    info!("break at 7 m/s");

    let mut frames = 0;
    while !table.is_at_rest() && frames < 120 * 60 {
        for collision in table.step(FRAME) {
            info!("t={:.3}s {}", table.get_time(), describe(&collision));
        }
        frames += 1;
    }

    println!("Table at rest after {:.2}s", table.get_time());
    for ball in table.balls() {
        let p = ball.get_position();
        match ball.get_pocket() {
            Some(pocket) => println!("  {} in {}", ball.get_id(), pocket),
            None => println!("  {} {} at ({:.3}, {:.3})", ball.get_id(), ball.get_state(), p.x, p.y),
        }
    }
    Ok(())
}
