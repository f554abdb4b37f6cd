use camera_kit::controller::{CameraControllerBuilder, MockControllerBuilder};
use camera_kit::plugins::QrScannerPlugin;
use camera_kit::settings::{Directory, ImageFormat, Rotation};
use criterion::{criterion_group, criterion_main, Criterion};
use std::sync::Arc;

fn bench_preview_with_qr(c: &mut Criterion) {
    let scanner = Arc::new(QrScannerPlugin::new());
    scanner.start_scanning();

    let mut controller = MockControllerBuilder::new()
        .frame_size(320, 240)
        .set_image_format(ImageFormat::Jpeg)
        .set_directory(Directory::Pictures)
        .add_plugin(scanner)
        .build()
        .expect("valid configuration");
    controller.start_session().expect("mock session opens");

    c.bench_function("next_frame_qr_320x240", |b| {
        b.iter(|| controller.next_frame().expect("mock frame"))
    });
}

fn bench_take_picture(c: &mut Criterion) {
    let mut group = c.benchmark_group("take_picture_640x480");
    for format in [ImageFormat::Jpeg, ImageFormat::Png] {
        let mut controller = MockControllerBuilder::new()
            .set_image_format(format)
            .set_rotation(Rotation::Deg90)
            .set_directory(Directory::Pictures)
            .build()
            .expect("valid configuration");
        controller.start_session().expect("mock session opens");

        group.bench_function(format.as_str(), |b| {
            b.iter(|| controller.take_picture().expect("mock picture"))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_preview_with_qr, bench_take_picture);
criterion_main!(benches);
