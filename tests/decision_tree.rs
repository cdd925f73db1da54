use minitree::prelude::*;
use minitree::generators::*;
use minitree::{FeatureType, Node};

use std::collections::HashMap;


fn setup() -> Context {
    let _ = env_logger::builder().is_test(true).try_init();
    Context::new("local", "decision-tree-suite").unwrap()
}


fn categorical_strategy() -> Strategy {
    let mut categorical_features_info = HashMap::new();
    categorical_features_info.insert(1, 2);
    Strategy::new(
        Algo::Classification,
        Impurity::Gini,
        4,   // max depth
        2,   // number of classes
        100, // max bins
        categorical_features_info,
    )
}


#[test]
fn run_dt_using_constructor() {
    let context = setup();
    let points = generate_categorical_data_points();
    let rdd = context.parallelize(points.clone());

    let learner = DecisionTree::new(categorical_strategy());
    let model = learner.run(&rdd).unwrap();

    let result = validate_prediction(&points, &model);
    let expect = rdd.count();
    assert_eq!(expect, result, "expected {expect}, got {result}.");

    context.stop();
}


#[test]
fn run_dt_using_static_method() {
    let context = setup();
    let points = generate_categorical_data_points();
    let rdd = context.parallelize(points.clone());

    let model = DecisionTree::train(&rdd, categorical_strategy()).unwrap();

    let result = validate_prediction(&points, &model);
    let expect = rdd.count();
    assert_eq!(expect, result, "expected {expect}, got {result}.");

    // Batched predictions agree with the single-point ones.
    let features = rdd.map(|point| point.features().clone());
    let batched = model.predict_all(&features).collect();
    let single = points.iter()
        .map(|point| model.predict(point.features()))
        .collect::<Vec<_>>();
    assert_eq!(single, batched);

    context.stop();
}


#[test]
fn both_entry_points_agree() {
    let context = setup();
    let rdd = context.parallelize_with_partitions(
        generate_categorical_data_points(), 3
    );

    let lhs = DecisionTree::new(categorical_strategy()).run(&rdd).unwrap();
    let rhs = DecisionTree::train(&rdd, categorical_strategy()).unwrap();
    assert_eq!(lhs, rhs);

    context.stop();
}


#[test]
fn debug_string_of_categorical_stump() {
    let context = setup();
    let rdd = context.parallelize(generate_categorical_data_points());
    let model = DecisionTree::train(&rdd, categorical_strategy()).unwrap();

    let result = model.to_debug_string();
    let expect = "DecisionTreeModel classifier of depth 1 with 3 nodes\n\
                  \x20 If (feature 0 <= 0.5)\n\
                  \x20  Predict: 1.0\n\
                  \x20 Else (feature 0 > 0.5)\n\
                  \x20  Predict: 0.0\n";
    assert_eq!(expect, result, "expected {expect}, got {result}.");

    context.stop();
}


#[test]
fn multiclass_with_unordered_categorical_features() {
    let context = setup();
    let points = generate_categorical_data_points_for_multiclass();
    let rdd = context.parallelize(points.clone());

    let strategy = Strategy::builder(Algo::Classification)
        .num_classes(3)
        .max_depth(2)
        .max_bins(100)
        .categorical_feature(0, 3)
        .build()
        .unwrap();
    let model = DecisionTree::train(&rdd, strategy).unwrap();

    assert_eq!(2, model.depth());
    assert_eq!(points.len(), validate_prediction(&points, &model));

    match model.root() {
        Node::Branch { split, .. } => {
            assert_eq!(0, split.feature);
            assert_eq!(FeatureType::Categorical, split.feature_type);
            assert_eq!(vec![0.0], split.categories);
        },
        Node::Leaf { .. } => panic!("the root must be a branch"),
    }

    context.stop();
}


#[test]
fn multiclass_with_continuous_features() {
    let context = setup();
    let points = generate_continuous_data_points_for_multiclass();
    let rdd = context.parallelize(points.clone());

    // Enough bins to put a threshold between every pair of values.
    let model = DecisionTree::train_classifier(
        &rdd, 3, HashMap::new(), "gini", 2, 3000,
    ).unwrap();

    assert_eq!(2, model.depth());
    assert_eq!(1.0, accuracy(&points, &model));

    match model.root() {
        Node::Branch { split, .. } => {
            assert_eq!(1, split.feature);
            assert!(split.threshold == 999.5 || split.threshold == 1999.5);
        },
        Node::Leaf { .. } => panic!("the root must be a branch"),
    }

    context.stop();
}


#[test]
fn entropy_fits_ordered_points() {
    let context = setup();
    let points = generate_ordered_labeled_points();
    let rdd = context.parallelize(points.clone());

    let model = DecisionTree::train_classifier(
        &rdd, 2, HashMap::new(), "entropy", 3, 100,
    ).unwrap();

    assert_eq!(points.len(), validate_prediction(&points, &model));

    context.stop();
}


#[test]
fn regression_on_ordered_points() {
    let context = setup();
    let points = generate_ordered_labeled_points();
    let rdd = context.parallelize(points.clone());

    let model = DecisionTree::train_regressor(
        &rdd, HashMap::new(), "variance", 3, 100,
    ).unwrap();

    assert_eq!(Algo::Regression, model.algo());
    let mse = mean_squared_error(&points, &model);
    approx::assert_abs_diff_eq!(0.0, mse, epsilon = 1e-12);

    context.stop();
}


#[test]
fn sampled_thresholds_are_deterministic() {
    let context = setup();
    // 20000 rows with 10 bins sample about 10000 rows for the thresholds.
    let points = (0..20_000)
        .map(|i| {
            let label = if i < 10_000 { 1.0 } else { 0.0 };
            LabeledPoint::new(label, vec![i as f64])
        })
        .collect::<Vec<_>>();
    let rdd = context.parallelize_with_partitions(points.clone(), 4);

    let strategy = Strategy::builder(Algo::Classification)
        .max_depth(1)
        .max_bins(10)
        .seed(7)
        .build()
        .unwrap();
    let lhs = DecisionTree::train(&rdd, strategy.clone()).unwrap();
    let rhs = DecisionTree::train(&rdd, strategy).unwrap();
    assert_eq!(lhs, rhs);

    match lhs.root() {
        Node::Branch { split, .. } => {
            assert_eq!(0, split.feature);
            let gap = (split.threshold - 9999.5).abs();
            assert!(gap < 300.0, "threshold {} is far from 9999.5.", split.threshold);
        },
        Node::Leaf { .. } => panic!("the root must be a branch"),
    }

    let result = accuracy(&points, &lhs);
    assert!(result > 0.98, "expected accuracy above 0.98, got {result}.");

    context.stop();
}


#[test]
fn constant_labels_give_a_single_leaf() {
    let context = setup();
    let rdd = context.parallelize(generate_ordered_labeled_points_with_label1());

    let strategy = Strategy::builder(Algo::Classification)
        .max_depth(3)
        .build()
        .unwrap();
    let model = DecisionTree::train(&rdd, strategy).unwrap();

    assert!(model.root().is_leaf());
    assert_eq!(1, model.num_nodes());
    assert_eq!(1.0, model.predict(&vec![3.0, 997.0].into()));

    context.stop();
}


#[test]
fn invalid_label_is_rejected() {
    let context = setup();
    let points = vec![
        LabeledPoint::new(0.0, vec![0.0]),
        LabeledPoint::new(2.0, vec![1.0]),
    ];
    let rdd = context.parallelize(points);

    let strategy = Strategy::default_strategy(Algo::Classification);
    let result = DecisionTree::train(&rdd, strategy);
    assert!(
        matches!(result, Err(TreeError::InvalidLabel { num_classes: 2, .. })),
        "expected InvalidLabel, got {result:?}."
    );

    context.stop();
}


#[test]
fn invalid_category_is_rejected() {
    let context = setup();
    let points = vec![
        LabeledPoint::new(0.0, vec![0.0, 1.0]),
        LabeledPoint::new(1.0, vec![1.0, 2.0]),
    ];
    let rdd = context.parallelize(points);

    let result = DecisionTree::train_classifier(
        &rdd, 2, HashMap::from([(1, 2)]), "gini", 3, 32,
    );
    assert!(
        matches!(result, Err(TreeError::InvalidCategory { feature: 1, .. })),
        "expected InvalidCategory, got {result:?}."
    );

    context.stop();
}


#[test]
fn invalid_strategy_is_rejected() {
    let context = setup();
    let rdd = context.parallelize(generate_categorical_data_points());

    let result = DecisionTree::train_regressor(
        &rdd, HashMap::new(), "gini", 3, 32,
    );
    assert!(matches!(result, Err(TreeError::InvalidStrategy(_))));

    context.stop();
}
