use std::path::Path;

use super::*;

fn solid(width: u32, height: u32, rgba: [u8; 4]) -> LayerImage {
    LayerImage {
        rgba8: RgbaImage::from_pixel(width, height, image::Rgba(rgba)),
    }
}

fn write_png(path: &Path, img: &RgbaImage) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    img.save_with_format(path, image::ImageFormat::Png).unwrap();
}

fn small_canvas() -> Canvas {
    Canvas {
        width: 4,
        height: 2,
    }
}

#[test]
fn empty_layer_list_yields_transparent_canvas() {
    let c = Compositor::new(small_canvas(), ResizeFilter::Nearest).unwrap();
    let out = c.render_layers(std::iter::empty()).unwrap();
    assert_eq!(out.dimensions(), (4, 2));
    assert!(out.pixels().all(|p| p.0 == [0, 0, 0, 0]));
}

#[test]
fn layers_are_resized_to_canvas() {
    let c = Compositor::new(small_canvas(), ResizeFilter::Nearest).unwrap();
    let out = c.render_layers([&solid(1, 1, [9, 8, 7, 255])]).unwrap();
    assert_eq!(out.dimensions(), (4, 2));
    assert!(out.pixels().all(|p| p.0 == [9, 8, 7, 255]));
}

#[test]
fn later_layers_are_composited_over_earlier_ones() {
    let c = Compositor::new(small_canvas(), ResizeFilter::Nearest).unwrap();

    // Left half opaque green, right half transparent.
    let mut top = RgbaImage::new(2, 1);
    top.put_pixel(0, 0, image::Rgba([0, 255, 0, 255]));
    let top = LayerImage { rgba8: top };
    let bottom = solid(2, 2, [0, 0, 255, 255]);

    let out = c.render_layers([&bottom, &top]).unwrap();
    assert_eq!(out.get_pixel(0, 0).0, [0, 255, 0, 255]);
    assert_eq!(out.get_pixel(1, 1).0, [0, 255, 0, 255]);
    assert_eq!(out.get_pixel(2, 0).0, [0, 0, 255, 255]);
    assert_eq!(out.get_pixel(3, 1).0, [0, 0, 255, 255]);

    let reversed = c.render_layers([&top, &bottom]).unwrap();
    assert!(reversed.pixels().all(|p| p.0 == [0, 0, 255, 255]));
}

#[test]
fn translucent_layer_blends_with_straight_alpha_output() {
    let c = Compositor::new(small_canvas(), ResizeFilter::Lanczos3).unwrap();
    let out = c
        .render_layers([
            &solid(3, 3, [0, 0, 255, 255]),
            &solid(5, 7, [255, 0, 0, 128]),
        ])
        .unwrap();
    assert!(out.pixels().all(|p| p.0 == [128, 0, 127, 255]));
}

#[test]
fn faint_canvas_sized_layer_is_returned_unchanged() {
    let c = Compositor::new(small_canvas(), ResizeFilter::Lanczos3).unwrap();
    for a in 1..=10u8 {
        let px = [200, 100, 50, a];
        let out = c.render_layers([&solid(4, 2, px)]).unwrap();
        assert!(out.pixels().all(|p| p.0 == px), "alpha {a}: {:?}", out.get_pixel(0, 0));
    }
}

#[test]
fn faint_layer_keeps_its_colour_when_resized() {
    let c = Compositor::new(small_canvas(), ResizeFilter::Nearest).unwrap();
    let out = c.render_layers([&solid(2, 1, [200, 100, 50, 3])]).unwrap();
    assert!(out.pixels().all(|p| p.0 == [200, 100, 50, 3]));
}

#[test]
fn render_resolves_attributes_in_order_and_reports_misses() {
    let dir = tempfile::tempdir().unwrap();
    write_png(
        &dir.path().join("Background/blue.png"),
        &RgbaImage::from_pixel(2, 2, image::Rgba([0, 0, 255, 255])),
    );
    write_png(
        &dir.path().join("Body/red.png"),
        &RgbaImage::from_pixel(3, 3, image::Rgba([255, 0, 0, 255])),
    );
    let lib = LayerLibrary::open(dir.path()).unwrap();

    let record = MetadataRecord {
        id: "7".to_string(),
        source: "7.json".into(),
        attributes: vec![
            Attribute::new("Background", "Blue"),
            Attribute::new("Hat", "Wizard"),
            Attribute::new("", "Red"),
            Attribute::new("Body", "Red"),
        ],
    };

    let c = Compositor::new(small_canvas(), ResizeFilter::Nearest).unwrap();
    let mut missed = Vec::new();
    let out = c
        .render(&record, &lib, &mut |a| missed.push(a.clone()))
        .unwrap();

    assert_eq!(out.layers_applied, 2);
    assert_eq!(out.misses, 1);
    assert_eq!(missed, vec![Attribute::new("Hat", "Wizard")]);
    assert!(out.image.pixels().all(|p| p.0 == [255, 0, 0, 255]));
}

#[test]
fn render_fails_on_undecodable_layer() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("Body")).unwrap();
    std::fs::write(dir.path().join("Body/red.png"), b"garbage").unwrap();
    let lib = LayerLibrary::open(dir.path()).unwrap();

    let record = MetadataRecord {
        id: "1".to_string(),
        source: "1.json".into(),
        attributes: vec![Attribute::new("Body", "Red")],
    };
    let c = Compositor::new(small_canvas(), ResizeFilter::Nearest).unwrap();
    assert!(c.render(&record, &lib, &mut |_| {}).is_err());
}

#[test]
fn zero_sized_canvas_is_rejected() {
    let canvas = Canvas {
        width: 0,
        height: 10,
    };
    assert!(Compositor::new(canvas, ResizeFilter::Nearest).is_err());
}
