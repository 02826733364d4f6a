//! Game rules: move legality, terminal detection and board parsing

mod common;

use common::{play, random_positions};
use noughts::{
    Error,
    tictactoe::{Board, GameOutcome, GameStatus, Player},
};

mod move_application {
    use super::*;

    #[test]
    fn test_first_move_leaves_eight_actions() {
        let board = play(&[4]);
        let actions = board.valid_actions();
        assert_eq!(actions.len(), 8);
        assert!(!actions.contains(&4));
        assert_eq!(board.current_player(), Player::O);
    }

    #[test]
    fn test_occupied_cell_is_rejected_without_mutation() {
        for board in random_positions(50, 11) {
            for pos in 0..9 {
                if board.get(pos) == noughts::tictactoe::Cell::Empty {
                    continue;
                }
                let mut copy = board.clone();
                assert!(!copy.apply_move(pos));
                assert_eq!(copy, board);
            }
        }
    }

    #[test]
    fn test_out_of_range_is_rejected() {
        let mut board = Board::new();
        assert!(!board.apply_move(9));
        assert_eq!(board, Board::new());
    }

    #[test]
    fn test_no_moves_after_game_ends() {
        let mut board = play(&[0, 3, 1, 4, 2]);
        assert!(board.is_terminal());
        assert!(board.valid_actions().is_empty());
        assert!(!board.apply_move(8));
        assert_eq!(board.current_player(), Player::X);
    }

    #[test]
    fn test_turn_alternation_invariant() {
        for board in random_positions(100, 3) {
            let x = board.history().iter().step_by(2).count();
            let o = board.history().iter().skip(1).step_by(2).count();
            assert!(x == o || x == o + 1);
        }
    }

    #[test]
    fn test_reset_restores_empty_board() {
        let mut board = play(&[0, 4, 8]);
        board.reset();
        assert_eq!(board, Board::new());
        assert_eq!(board.valid_actions(), (0..9).collect::<Vec<_>>());
    }
}

mod terminal_detection {
    use super::*;

    #[test]
    fn test_top_row_parses_as_x_win() {
        let board: Board = "XXX      ".parse().unwrap();
        assert_eq!(board.check_winner(), GameStatus::Won(Player::X));
        assert!(board.is_terminal());
    }

    #[test]
    fn test_full_board_without_line_is_draw() {
        let board: Board = "XOXXOOOXX".parse().unwrap();
        assert_eq!(board.check_winner(), GameStatus::Draw);
        assert_eq!(board.outcome(), Some(GameOutcome::Draw));
    }

    #[test]
    fn test_win_on_last_cell_is_not_a_draw() {
        // X completes the 0-4-8 diagonal with the ninth mark
        let board = play(&[0, 1, 2, 5, 3, 6, 4, 7, 8]);
        assert_eq!(board.check_winner(), GameStatus::Won(Player::X));
    }

    #[test]
    fn test_status_is_exclusive_on_random_games() {
        for board in random_positions(200, 5) {
            let status = board.check_winner();
            let full = board.valid_actions().is_empty() && !board.is_terminal();
            assert!(!full, "full board must be terminal");
            match status {
                GameStatus::Won(_) => assert_ne!(board.outcome(), Some(GameOutcome::Draw)),
                GameStatus::Draw => assert!(board.winner().is_none()),
                GameStatus::InProgress => assert!(!board.valid_actions().is_empty()),
            }
        }
    }
}

mod parsing {
    use super::*;

    #[test]
    fn test_display_roundtrip() {
        let board = play(&[0, 4, 8, 2]);
        let reparsed: Board = board.to_string().parse().unwrap();
        assert_eq!(reparsed.cells(), board.cells());
        assert_eq!(reparsed.current_player(), board.current_player());
    }

    #[test]
    fn test_short_input() {
        let err = "XO".parse::<Board>().unwrap_err();
        assert!(matches!(err, Error::InvalidBoardLength { got: 2, .. }));
    }

    #[test]
    fn test_bad_character() {
        let err = "XO?......".parse::<Board>().unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidCellCharacter {
                character: '?',
                position: 2,
                ..
            }
        ));
    }
}
