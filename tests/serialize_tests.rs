use billiard_physics::{
    Ball, BallData, BallId, BallState, CushionData, CushionId, FormulaBackend, PhysicsParams,
    Pocket, PocketData, PocketId, Polygon, Shot, Table, TableData, Vector3,
};

fn sample_table() -> Table {
    let params = PhysicsParams::default();
    let mut table = Table::new(params.clone()).unwrap();
    table
        .add_cushion(
            Polygon::new(
                CushionId(4),
                [
                    Vector3::new(2.0, 0.0, 0.0),
                    Vector3::new(2.05, 0.0, 0.0),
                    Vector3::new(2.05, 1.0, 0.0),
                    Vector3::new(2.0, 1.0, 0.0),
                ],
            )
            .unwrap(),
        )
        .unwrap();
    table.add_pocket(Pocket::new(PocketId(1), 0.2, 0.2, 0.06, 0.1).unwrap()).unwrap();
    table.add_ball(Ball::with_params(BallId(0), 1.0, 0.5, &params)).unwrap();
    table.add_ball(Ball::with_params(BallId(1), 0.21, 0.2, &params)).unwrap();
    table
        .strike(BallId(0), &Shot::new(Vector3::new(1.0, 0.2, 0.0), 1.2).with_side_spin(0.3))
        .unwrap();
    for _ in 0..20 {
        table.step(1.0 / 60.0);
    }
    table
}

#[test]
fn test_ball_data_json_round_trip() {
    let table = sample_table();
    let data = table.get_ball(BallId(0)).unwrap().serialize();
    let json = serde_json::to_string(&data).unwrap();
    let back: BallData = serde_json::from_str(&json).unwrap();
    assert_eq!(back, data);

    let pocketed = table.get_ball(BallId(1)).unwrap().serialize();
    assert_eq!(pocketed.state, BallState::Pocketed);
    let back: BallData = serde_json::from_str(&serde_json::to_string(&pocketed).unwrap()).unwrap();
    assert_eq!(back.pocket_id, Some(PocketId(1)));
}

#[test]
fn test_shape_data_json_round_trip() {
    let table = sample_table();

    let cushion = table.get_cushion(CushionId(4)).unwrap().serialize();
    let back: CushionData = serde_json::from_str(&serde_json::to_string(&cushion).unwrap()).unwrap();
    assert_eq!(back, cushion);
    assert_eq!(Polygon::from_data(&back).unwrap().get_edges(), table.get_cushion(CushionId(4)).unwrap().get_edges());

    let pocket = table.get_pocket(PocketId(1)).unwrap().serialize();
    let back: PocketData = serde_json::from_str(&serde_json::to_string(&pocket).unwrap()).unwrap();
    assert_eq!(back, pocket);
    assert_eq!(back.balls, vec![BallId(1)]);
}

#[test]
fn test_table_data_json_round_trip() {
    let table = sample_table();
    let data = table.serialize();
    let json = serde_json::to_string_pretty(&data).unwrap();
    let back: TableData = serde_json::from_str(&json).unwrap();
    assert_eq!(back, data);

    let rebuilt = Table::from_data(table.get_params().clone(), &back).unwrap();
    assert_eq!(rebuilt.serialize(), data);
}

#[test]
fn test_params_fill_missing_fields_with_defaults() {
    let params: PhysicsParams =
        serde_json::from_str(r#"{ "ball_radius": 0.026, "formula_backend": "Fallback" }"#).unwrap();
    assert_eq!(params.ball_radius, 0.026);
    assert_eq!(params.formula_backend, FormulaBackend::Fallback);
    assert_eq!(params.gravity, PhysicsParams::default().gravity);

    let json = serde_json::to_string(&PhysicsParams::default()).unwrap();
    let back: PhysicsParams = serde_json::from_str(&json).unwrap();
    assert_eq!(back, PhysicsParams::default());
}
