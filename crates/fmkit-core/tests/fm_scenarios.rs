//! End-to-end scenarios through the public API.

use ndarray::{arr1, arr2, Array1, Array2};

use fmkit_core::{
    proximal_step, CoefficientError, Coefficients, FmCoefficients, FmConfig, GaussianSource,
    GroupReg, Groups,
};

#[test]
fn shrink_example_from_docs() {
    let mut fm = FmCoefficients::from_parts(
        2.0,
        arr1(&[3.0, -4.0]),
        arr2(&[[0.0, 1.0]]),
        Groups::all(),
    );
    fm.l1_shrink(&GroupReg::from([1.0, 1.0, 1.0]), 1.0);

    assert_eq!(fm.bias(), 1.0);
    assert_eq!(fm.weights(), arr1(&[2.0, -3.0]));
    // Factor threshold is 1 * 1 / 2 latent dimensions.
    assert_eq!(fm.factors(), arr2(&[[0.0, 0.5]]));
}

#[test]
fn l2_value_ignores_disabled_groups() {
    let fm = FmCoefficients::from_parts(
        100.0,
        arr1(&[1.0, 2.0, 3.0]),
        arr2(&[[50.0, -50.0]]),
        Groups::new(false, true, false),
    );
    let reg = GroupReg::new(1.0, 0.2, 1.0);
    let expected = 0.5 * 0.2 * 14.0;
    assert!((fm.l2_reg_value(&reg) - expected).abs() < 1e-6);
}

#[test]
fn weight_lines_descend_by_value() {
    let fm = FmCoefficients::from_parts(
        0.0,
        arr1(&[5.0, 1.0]),
        Array2::zeros((1, 1)),
        Groups::all(),
    );
    let text = fm.encode();
    let lines: Vec<&str> = text.split('\n').collect();
    assert_eq!(lines, ["2:1,1,0:true,true,true", "0.0", "0,5.0", "1,1.0"]);
}

#[test]
fn training_loop_with_checkpoint_text() {
    let config = FmConfig::new(32, 32, 4).with_init(0.0, 0.1);
    let mut rng = GaussianSource::seeded(2024);
    let mut model = config.build(&mut rng).unwrap();
    let reg = GroupReg::new(0.0, 0.05, 0.05);

    for _ in 0..10 {
        let gradient = model.copy_empty(&mut rng);
        let penalty = model.l2_reg_gradient(&reg);
        let mut total = gradient;
        total.add_in_place(&penalty).unwrap();
        proximal_step(&mut model, &total, &reg, 0.1).unwrap();
    }

    let restored = FmCoefficients::decode(&model.encode()).unwrap();
    assert_eq!(restored.weights(), model.weights());
    assert_eq!(restored.factors(), model.factors());
    assert_eq!(restored.bias(), model.bias());
    assert!((restored.norm() - model.norm()).abs() < 1e-6);
}

#[test]
fn config_from_json_builds_model() {
    let json = r#"{
        "num_features": 6,
        "num_interact_features": 3,
        "num_factors": 2,
        "groups": { "bias": false, "first_order": true, "second_order": true },
        "init": { "mean": 0.0, "stdev": 0.0 }
    }"#;
    let config = FmConfig::from_json_str(json).unwrap();
    let model = config.build(&mut GaussianSource::seeded(1)).unwrap();

    assert_eq!(model.num_features(), 6);
    assert_eq!(model.factors().dim(), (3, 2));
    assert!(!model.groups().bias);
    assert_eq!(model.norm(), 0.0);
}

#[test]
fn mismatched_shapes_are_reported() {
    let mut a =
        FmCoefficients::from_parts(0.0, Array1::zeros(3), Array2::zeros((2, 2)), Groups::all());
    let b =
        FmCoefficients::from_parts(0.0, Array1::zeros(3), Array2::zeros((3, 2)), Groups::all());

    let err = a.add_in_place(&b).unwrap_err();
    assert_eq!(
        err,
        CoefficientError::DimensionMismatch {
            group: "factors.rows",
            expected: 2,
            actual: 3
        }
    );
    assert!(!err.is_decode_error());
}

#[test]
fn corrupt_text_is_rejected() {
    let model = FmConfig::new(4, 2, 2)
        .build(&mut GaussianSource::seeded(5))
        .unwrap();
    let text = model.encode();

    let truncated: String = text.split('\n').take(3).collect::<Vec<_>>().join("\n");
    let err = FmCoefficients::decode(&truncated).unwrap_err();
    assert!(matches!(err, CoefficientError::UnexpectedEnd { .. }));
    assert!(err.is_decode_error());

    let garbled = text.replacen(',', ";", 1);
    assert!(FmCoefficients::decode(&garbled).is_err());
}
