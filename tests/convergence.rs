//! Self-play training produces a strong second player

use noughts::{
    pipeline::{TrainingConfig, evaluate_against_random, train_with_config},
    q_learning::Hyperparameters,
    tictactoe::Player,
};

fn assert_strong_second_player(seed: u64, params: Hyperparameters) {
    let config = TrainingConfig {
        episodes: 5000,
        seed: Some(seed),
        ..TrainingConfig::default()
    };

    let (mut agent, result) = train_with_config(config, params).unwrap();
    assert_eq!(result.total_episodes, 5000);
    assert!(agent.table().len() > 100);

    let evaluation =
        evaluate_against_random(&mut agent, Player::O, 2000, Some(seed.wrapping_add(99))).unwrap();
    assert!(
        evaluation.non_losing_rate() > 0.8,
        "seed {seed}: non-losing rate {:.3} (wins {}, draws {}, losses {})",
        evaluation.non_losing_rate(),
        evaluation.wins,
        evaluation.draws,
        evaluation.losses
    );
}

#[test_log::test]
fn test_default_settings_train_a_strong_second_player() {
    let params = Hyperparameters::default();
    assert!(params.use_symmetry);
    for seed in [1, 2, 3, 4, 5] {
        assert_strong_second_player(seed, params);
    }
}

#[test_log::test]
fn test_table_growth_and_epsilon_history_are_monotone() {
    let config = TrainingConfig {
        episodes: 500,
        seed: Some(8),
        report_interval: 100,
        ..TrainingConfig::default()
    };
    let (agent, _) = train_with_config(config, Hyperparameters::default()).unwrap();

    let sizes = agent.table_size_history();
    assert_eq!(sizes.len(), 500);
    assert!(sizes.windows(2).all(|w| w[0] <= w[1]));

    let epsilons = agent.epsilon_history();
    assert!(epsilons.windows(2).all(|w| w[0] >= w[1]));
    assert!(epsilons.iter().all(|&e| e >= agent.hyperparameters().epsilon_min));
}
