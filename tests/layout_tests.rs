//! Settings and authored layout tests

use match3::core::{CoreError, LayoutTileFactory, RandomTileFactory, Settings, TileFactory};
use match3::engine::{EngineError, Session};
use match3::types::{Coord, TileKind, LAYOUT_RANDOM};

fn settings(width: u8, height: u8, layout: Vec<i32>) -> Settings {
    Settings {
        width,
        height,
        layout,
        ..Settings::default()
    }
}

#[test]
fn test_layout_indexing_is_x_plus_y_times_width() {
    // 3 x 2 board: (2, 0) -> index 2, (0, 1) -> index 3
    let mut layout = vec![LAYOUT_RANDOM; 6];
    layout[2] = 1;
    layout[3] = 4;
    let session = Session::from_settings(&settings(3, 2, layout), Some(1)).unwrap();
    let board = session.board();
    assert_eq!(board.kind_at(Coord::new(2, 0)).unwrap(), Some(TileKind(1)));
    assert_eq!(board.kind_at(Coord::new(0, 1)).unwrap(), Some(TileKind(4)));
}

#[test]
fn test_fully_authored_layout_is_reproduced() {
    let layout = vec![0, 1, 2, 3, 4, 0, 1, 2, 3];
    for seed in [1, 2, 99] {
        let session = Session::from_settings(&settings(3, 3, layout.clone()), Some(seed)).unwrap();
        let kinds: Vec<i32> = session
            .board()
            .kinds()
            .into_iter()
            .map(|k| k.map(|k| i32::from(k.0)).unwrap_or(-1))
            .collect();
        assert_eq!(kinds, layout);
    }
}

#[test]
fn test_invalid_layout_values_fall_back_to_random() {
    let fallback = RandomTileFactory::new(5, 4).unwrap();
    let mut factory = LayoutTileFactory::new(2, 1, &[-2, 5], fallback);
    assert_eq!(factory.forced_count(), 0);
    assert_eq!(factory.issues().len(), 2);
    for issue in factory.issues() {
        assert!(matches!(issue, CoreError::InvalidLayoutIndex { palette_len: 5, .. }));
    }
    assert!(factory.make(Coord::new(0, 0)).index() < 5);
    assert!(factory.make(Coord::new(1, 0)).index() < 5);
}

#[test]
fn test_invalid_layout_does_not_fail_session() {
    let session = Session::from_settings(&settings(2, 2, vec![0, 17, -5, 1]), Some(3)).unwrap();
    let board = session.board();
    assert!(board.is_full());
    assert_eq!(board.kind_at(Coord::new(0, 0)).unwrap(), Some(TileKind(0)));
    assert_eq!(board.kind_at(Coord::new(1, 1)).unwrap(), Some(TileKind(1)));
}

#[test]
fn test_layout_of_wrong_length_is_ignored() {
    let with_bad_layout = Session::from_settings(&settings(4, 4, vec![0; 5]), Some(8)).unwrap();
    let without_layout = Session::from_settings(&settings(4, 4, Vec::new()), Some(8)).unwrap();
    assert_eq!(with_bad_layout.board().kinds(), without_layout.board().kinds());
}

#[test]
fn test_empty_palette_fails_before_population() {
    let s = Settings {
        palette: Vec::new(),
        ..Settings::default()
    };
    let err = Session::from_settings(&s, None).unwrap_err();
    assert!(matches!(err, EngineError::Core(CoreError::EmptyPalette)));
}

#[test]
fn test_settings_file_roundtrip() {
    let path = std::env::temp_dir().join(format!("match3-settings-{}.json", std::process::id()));
    let mut s = settings(3, 3, Vec::new());
    s.init_layout();
    s.set_layout_value(1, 1, 2).unwrap();
    s.seed = Some(77);
    std::fs::write(&path, s.to_json_string().unwrap()).unwrap();

    let loaded = Settings::load(&path).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(loaded, s);

    let session = Session::from_settings(&loaded, None).unwrap();
    assert_eq!(session.seed(), 77);
    assert_eq!(session.board().kind_at(Coord::new(1, 1)).unwrap(), Some(TileKind(2)));
}

#[test]
fn test_missing_settings_file_is_io_error() {
    let err = Settings::load("/definitely/not/here/match3.json").unwrap_err();
    assert!(matches!(err, CoreError::Io(_)));
}
