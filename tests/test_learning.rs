use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use approx::assert_relative_eq;

use neurograph::learning::do_one_learning_iteration;
use neurograph::learning::CompetitiveLearning;
use neurograph::learning::KohonenLearning;
use neurograph::learning::LearningProgress;
use neurograph::learning::Lms;
use neurograph::learning::SupervisedLearning;
use neurograph::nets;
use neurograph::LearningRule;
use neurograph::NeuralError;
use neurograph::NeuralNetwork;
use neurograph::TrainingSet;

/// `y = 0.5 * a - 0.25 * b`, which an adaline can fit exactly.
fn linear_set() -> TrainingSet {
    let mut set = TrainingSet::with_sizes(2, 1);
    for [a, b] in [[1.0, 0.0], [0.0, 1.0], [1.0, 1.0], [0.5, 0.2]] {
        set.add_supervised(vec![a, b], vec![0.5 * a - 0.25 * b]).unwrap();
    }
    set
}

fn zeroed_adaline() -> NeuralNetwork {
    let mut network = nets::adaline(2).unwrap();
    network.initialize_weights(0.0);
    network
}

fn counting_observer(count: &Arc<AtomicUsize>) -> Box<dyn FnMut(&LearningProgress) + Send> {
    let count = Arc::clone(count);
    Box::new(move |_| {
        count.fetch_add(1, Ordering::SeqCst);
    })
}

#[test]
fn test_training_set_checks_sizes() {
    let mut set = TrainingSet::with_sizes(2, 1);
    assert_eq!(
        set.add_supervised(vec![1.0, 2.0, 3.0], vec![1.0]),
        Err(NeuralError::VectorSizeMismatch { expected: 2, actual: 3 })
    );
    assert_eq!(
        set.add_supervised(vec![1.0, 2.0], vec![1.0, 0.0]),
        Err(NeuralError::VectorSizeMismatch { expected: 1, actual: 2 })
    );
    assert!(set.is_empty());

    assert!(!set.is_supervised());
    set.add_supervised(vec![1.0, 2.0], vec![1.0]).unwrap();
    assert!(set.is_supervised());
    set.add_unsupervised(vec![3.0, 4.0]).unwrap();
    assert_eq!(set.len(), 2);
    assert!(!set.is_supervised());
    assert_eq!(set[1].input(), &[3.0, 4.0]);

    assert!(set.remove(0).is_some());
    assert!(set.remove(5).is_none());
    set.clear();
    assert!(set.is_empty());
}

#[test]
fn test_lms_fits_a_linear_map() {
    let mut network = zeroed_adaline();
    network.learn_to_error_within(&linear_set(), 1e-6, 10_000).unwrap();

    let output = network.output_neurons()[0];
    let weights = network.weights(output);
    assert_relative_eq!(weights[0], 0.5, epsilon = 1e-2);
    assert_relative_eq!(weights[1], -0.25, epsilon = 1e-2);
}

#[test]
fn test_supervised_rule_rejects_unlabelled_elements() {
    let mut network = zeroed_adaline();
    let mut set = TrainingSet::new();
    set.add_unsupervised(vec![1.0, 0.0]).unwrap();

    assert_eq!(network.learn(&set), Err(NeuralError::MissingDesiredOutput { index: 0 }));
}

#[test]
fn test_desired_output_length_is_checked() {
    let mut network = zeroed_adaline();
    let mut set = TrainingSet::new();
    set.add_supervised(vec![1.0, 0.0], vec![1.0, 1.0]).unwrap();

    assert!(matches!(network.learn(&set), Err(NeuralError::VectorSizeMismatch { .. })));
}

#[test]
fn test_iteration_limit_and_observers() {
    let mut network = zeroed_adaline();
    let count = Arc::new(AtomicUsize::new(0));
    let mut rule = Lms::new();
    rule.add_observer(counting_observer(&count));
    network.set_learning_rule(Box::new(rule));

    // an error goal of zero is never reached
    network.learn_to_error_within(&linear_set(), 0.0, 25).unwrap();

    let progress = network.learning_rule().unwrap().progress();
    assert_eq!(progress.iteration, 25);
    assert_eq!(count.load(Ordering::SeqCst), 25);
    assert!(progress.total_network_error.unwrap() > 0.0);
}

#[test]
fn test_stalled_error_stops_learning() {
    // contradicting targets: the error settles but never reaches the goal
    let mut set = TrainingSet::with_sizes(1, 1);
    set.add_supervised(vec![1.0], vec![1.0]).unwrap();
    set.add_supervised(vec![1.0], vec![0.0]).unwrap();

    let mut network = nets::adaline(1).unwrap();
    let mut rule = Lms::new();
    rule.supervised_mut().set_stall_limit(1e-9, 3);
    network.set_learning_rule(Box::new(rule));
    network.learn_to_error_within(&set, 0.0, 100_000).unwrap();

    let iterations = network.learning_rule().unwrap().progress().iteration;
    assert!(iterations < 100_000, "stopped after {iterations} iterations");
}

#[test]
fn test_one_learning_iteration() {
    let mut network = zeroed_adaline();
    let count = Arc::new(AtomicUsize::new(0));
    let mut rule = Lms::new();
    rule.add_observer(counting_observer(&count));

    do_one_learning_iteration(&mut rule, &mut network, &linear_set()).unwrap();

    assert_eq!(count.load(Ordering::SeqCst), 1);
    assert_eq!(rule.progress().iteration, 0);
    assert!(rule.supervised().total_network_error() > 0.0);
    let output = network.output_neurons()[0];
    assert!(network.weights(output).iter().any(|&w| w != 0.0));
}

#[test]
fn test_second_run_is_rejected_while_running() {
    let mut network = zeroed_adaline();
    let control = Arc::clone(network.learning_rule().unwrap().control());

    let guard = control.begin().unwrap();
    assert_eq!(network.learn(&linear_set()), Err(NeuralError::AlreadyRunning));

    drop(guard);
    assert!(network.learn_to_error_within(&linear_set(), 0.0, 3).is_ok());
}

#[test]
fn test_learning_without_rule() {
    let mut network = nets::max_net(2).unwrap();
    assert_eq!(network.learn(&TrainingSet::new()), Err(NeuralError::NoLearningRule));
}

#[test]
fn test_background_stop() {
    let mut network = zeroed_adaline();
    let count = Arc::new(AtomicUsize::new(0));
    network.learning_rule_mut().unwrap().add_observer(counting_observer(&count));
    network.learning_rule_mut().unwrap().set_max_error(0.0);

    let training = network.learn_in_background(linear_set());
    thread::sleep(Duration::from_millis(20));
    training.stop();
    let (network, outcome) = training.join().unwrap();
    outcome.unwrap();

    let progress = network.learning_rule().unwrap().progress();
    assert_eq!(count.load(Ordering::SeqCst), progress.iteration);
    assert!(!network.learning_rule().unwrap().control().is_running());
}

#[test]
fn test_pause_and_resume_match_an_uninterrupted_run() {
    let mut straight = zeroed_adaline();
    straight.learn_to_error_within(&linear_set(), 0.0, 200).unwrap();

    let mut network = zeroed_adaline();
    let rule = network.learning_rule_mut().unwrap();
    rule.set_max_error(0.0);
    rule.set_max_iterations(200);

    let training = network.learn_in_background(linear_set());
    training.pause();
    thread::sleep(Duration::from_millis(10));
    let paused_at = training.progress().iteration;
    thread::sleep(Duration::from_millis(10));
    // no epochs complete while paused, beyond the one in flight
    assert!(training.progress().iteration <= paused_at + 1);
    training.resume();
    let (paused, outcome) = training.join().unwrap();
    outcome.unwrap();

    let output = straight.output_neurons()[0];
    assert_eq!(paused.weights(output), straight.weights(output));
    assert_eq!(paused.learning_rule().unwrap().progress().iteration, 200);
}

#[test]
fn test_stop_wakes_a_paused_run() {
    let mut network = zeroed_adaline();
    network.learning_rule_mut().unwrap().set_max_error(0.0);

    let training = network.learn_in_background(linear_set());
    training.pause();
    thread::sleep(Duration::from_millis(10));
    training.stop();

    let (_, outcome) = training.join().unwrap();
    assert!(outcome.is_ok());
}

#[test]
fn test_background_without_rule_reports_on_join() {
    let network = nets::max_net(2).unwrap();
    let training = network.learn_in_background(TrainingSet::new());
    let (_, outcome) = training.join().unwrap();
    assert_eq!(outcome, Err(NeuralError::NoLearningRule));
}

#[test]
fn test_max_net_picks_the_largest_input() {
    let mut network = nets::max_net(3).unwrap();
    network.set_input(&[0.9, 0.5, 0.1]).unwrap();
    network.calculate();

    let layer = network.layer(1).unwrap();
    assert_eq!(layer.winner(), layer.neuron_at(0));
    let output = network.output();
    assert!(output[0] > 0.0);
    assert_eq!(&output[1..], &[0.0, 0.0]);
}

#[test]
fn test_competitive_learning_moves_the_winner() {
    let mut network = nets::competitive_network(2, 2).unwrap();
    let inputs = network.input_neurons().to_vec();
    let outputs = network.output_neurons().to_vec();
    for (i, &input) in inputs.iter().enumerate() {
        for (j, &output) in outputs.iter().enumerate() {
            let weight = if i == j { 0.9 } else { 0.1 };
            let id = network.connection_between(input, output).unwrap();
            network.connection_mut(id).unwrap().weight_mut().set_value(weight);
        }
    }

    let mut set = TrainingSet::new();
    set.add_unsupervised(vec![1.0, 0.0]).unwrap();
    network.learn(&set).unwrap();

    assert_eq!(network.layer(1).unwrap().winner(), Some(outputs[0]));
    let weight = |from: usize, to: usize| {
        let id = network.connection_between(inputs[from], outputs[to]).unwrap();
        network.connection(id).unwrap().weight().value()
    };
    assert_relative_eq!(weight(0, 0), 0.91, epsilon = 1e-12);
    assert_relative_eq!(weight(1, 0), 0.09, epsilon = 1e-12);
    assert_relative_eq!(weight(0, 1), 0.1, epsilon = 1e-12);
    assert_relative_eq!(weight(1, 1), 0.9, epsilon = 1e-12);
    assert_eq!(network.learning_rule().unwrap().progress().iteration, 1);
}

#[test]
fn test_competitive_learning_stops_after_one_epoch() {
    let mut network = nets::competitive_network(2, 3).unwrap();
    let mut set = TrainingSet::new();
    set.add_unsupervised(vec![1.0, 0.0]).unwrap();
    set.add_unsupervised(vec![0.0, 1.0]).unwrap();

    let mut rule = CompetitiveLearning::new();
    rule.learn(&mut network, &set).unwrap();
    assert_eq!(rule.progress().iteration, 1);
}

#[test]
fn test_hopfield_stores_pattern_correlations() {
    let mut network = nets::hopfield(3).unwrap();
    nets::store_patterns(&mut network);

    let mut set = TrainingSet::with_sizes(3, 0);
    set.add_unsupervised(vec![1.0, 1.0, -1.0]).unwrap();
    set.add_unsupervised(vec![1.0, -1.0, 1.0]).unwrap();
    network.learn(&set).unwrap();

    let neurons = network.layer(0).unwrap().neurons().to_vec();
    let weight = |from: usize, to: usize| {
        let id = network.connection_between(neurons[from], neurons[to]).unwrap();
        network.connection(id).unwrap().weight().value()
    };
    assert_eq!(weight(0, 1), 0.0);
    assert_eq!(weight(0, 2), 0.0);
    assert_eq!(weight(1, 2), -2.0);
    for i in 0..3 {
        for j in 0..3 {
            if i != j {
                assert_eq!(weight(i, j), weight(j, i));
            }
        }
    }
}

#[test]
fn test_hopfield_rejects_short_patterns() {
    let mut network = nets::hopfield(3).unwrap();
    nets::store_patterns(&mut network);
    let mut set = TrainingSet::new();
    set.add_unsupervised(vec![1.0, 1.0]).unwrap();

    assert_eq!(
        network.learn(&set),
        Err(NeuralError::VectorSizeMismatch { expected: 3, actual: 2 })
    );
}

#[test]
fn test_kohonen_phases() {
    let mut network = nets::kohonen(2, 4).unwrap();
    let mut rule = KohonenLearning::new();
    rule.set_iterations(10, 0);
    network.set_learning_rule(Box::new(rule));

    let mut set = TrainingSet::new();
    set.add_unsupervised(vec![0.1, 0.1]).unwrap();
    set.add_unsupervised(vec![0.9, 0.9]).unwrap();
    network.learn(&set).unwrap();

    let progress = network.learning_rule().unwrap().progress();
    assert_eq!(progress.iteration, 9);
    // halved after each phase
    assert_relative_eq!(progress.learning_rate, 0.225, epsilon = 1e-12);
}

#[test]
fn test_kohonen_stop_from_observer() {
    let mut network = nets::kohonen(2, 4).unwrap();
    let mut rule = KohonenLearning::new();
    let control = Arc::clone(rule.control());
    rule.add_observer(Box::new(move |progress: &LearningProgress| {
        if progress.iteration == 3 {
            control.stop();
        }
    }));
    network.set_learning_rule(Box::new(rule));

    let mut set = TrainingSet::new();
    set.add_unsupervised(vec![0.2, 0.7]).unwrap();
    network.learn(&set).unwrap();

    let progress = network.learning_rule().unwrap().progress();
    assert_eq!(progress.iteration, 3);
    assert_relative_eq!(progress.learning_rate, 0.9, epsilon = 1e-12);
}
