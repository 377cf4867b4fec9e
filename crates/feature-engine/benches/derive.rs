use criterion::{black_box, criterion_group, criterion_main, Criterion};
use data_validator::SensorReading;
use feature_engine::{CategoryEncoder, FeatureEngineer, FeatureSchema, LabelEncoders, COMPONENT_TYPE_COLUMN};

fn bench_derive(c: &mut Criterion) {
    let encoders = LabelEncoders::new().with(
        COMPONENT_TYPE_COLUMN,
        CategoryEncoder::fit(["engine", "landing_gear", "hydraulic_system"]),
    );
    let engineer = FeatureEngineer::default();
    let schema = FeatureSchema::canonical();
    let reading = SensorReading {
        aircraft_id: "AC001".into(),
        component_type: "engine".into(),
        vibration_level: 8.5,
        temperature: 750.0,
        pressure: 35.0,
        wear_level: 85.0,
        oil_quality: 65.0,
        rpm: 4500.0,
        fuel_flow: 1200.0,
        health_score: 45.0,
        operating_hours: 8500.0,
        cycles: 4200.0,
    };

    c.bench_function("derive_and_project", |b| {
        b.iter(|| {
            let features = engineer.derive(black_box(&reading), &encoders).unwrap();
            features.to_vector(&schema)
        })
    });
}

criterion_group!(benches, bench_derive);
criterion_main!(benches);
