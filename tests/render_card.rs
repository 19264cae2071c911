use std::path::{Path, PathBuf};

use rand::SeedableRng;
use rand::rngs::StdRng;

use quotecard::{CardRenderer, Config, Dirs};

fn scratch_root(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("quotecard_it_{name}_{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn config_at(root: &Path) -> Config {
    let config = Config {
        dirs: Dirs::new(root),
        ..Config::default()
    };
    quotecard::assets::ensure_dirs(&config.dirs).unwrap();
    config
}

#[test]
fn render_without_assets_produces_exact_dimensions_and_black_corners() {
    let root = scratch_root("bare");
    let config = config_at(&root);
    let renderer = CardRenderer::new(&config);

    let artifacts = renderer
        .render(
            "A d\u{fa}vida \u{e9} o in\u{ed}cio da sabedoria.",
            &mut StdRng::seed_from_u64(0),
        )
        .unwrap();

    assert!(artifacts.card.is_file());
    assert!(artifacts.thumbnail.is_file());

    let card = image::open(&artifacts.card).unwrap().to_rgb8();
    assert_eq!(card.dimensions(), (1080, 1080));
    for (x, y) in [(0, 0), (1079, 0), (0, 1079), (1079, 1079)] {
        assert_eq!(card.get_pixel(x, y).0, [0, 0, 0]);
    }

    let thumb = image::open(&artifacts.thumbnail).unwrap().to_rgb8();
    assert_eq!(thumb.dimensions(), (1080, 1920));

    let _ = std::fs::remove_dir_all(&root);
}

#[test]
fn render_overwrites_the_previous_card_in_place() {
    let root = scratch_root("overwrite");
    let config = config_at(&root);
    let renderer = CardRenderer::new(&config);
    let mut rng = StdRng::seed_from_u64(1);

    let first = renderer.render("first quote", &mut rng).unwrap();
    let second = renderer.render("second quote", &mut rng).unwrap();
    assert_eq!(first.card, second.card);
    assert!(second.card.is_file());

    let _ = std::fs::remove_dir_all(&root);
}

#[test]
fn background_asset_is_dimmed_into_the_card() {
    let root = scratch_root("background");
    let config = config_at(&root);

    let bg = image::RgbImage::from_pixel(64, 64, image::Rgb([255, 255, 255]));
    bg.save(config.dirs.backgrounds().join("white.png")).unwrap();

    let renderer = CardRenderer::new(&config);
    let artifacts = renderer
        .render("quote over a background", &mut StdRng::seed_from_u64(2))
        .unwrap();

    // White at uniform alpha 80 over black lands on 80-grey; allow for JPEG
    // quantization.
    let card = image::open(&artifacts.card).unwrap().to_rgb8();
    for channel in card.get_pixel(0, 0).0 {
        assert!(
            (i16::from(channel) - 80).abs() <= 4,
            "corner channel {channel} too far from 80"
        );
    }

    let _ = std::fs::remove_dir_all(&root);
}

#[test]
fn unreadable_background_degrades_to_plain_black() {
    let root = scratch_root("badbg");
    let config = config_at(&root);

    // A file with an image extension but no decodable content.
    std::fs::write(config.dirs.backgrounds().join("corrupt.jpg"), b"not an image").unwrap();

    let renderer = CardRenderer::new(&config);
    let artifacts = renderer
        .render("still renders", &mut StdRng::seed_from_u64(3))
        .unwrap();

    let card = image::open(&artifacts.card).unwrap().to_rgb8();
    assert_eq!(card.get_pixel(0, 0).0, [0, 0, 0]);

    let _ = std::fs::remove_dir_all(&root);
}
