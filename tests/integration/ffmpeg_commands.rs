// ffmpeg command generation from transcode parameters

use std::path::Path;
use vidbatch::engine::{TranscodeParameters, build_transcode_cmd, placement_expr};

use crate::common::assertions::*;

fn cmd_for(params: &TranscodeParameters) -> String {
    let cmd = build_transcode_cmd(
        Path::new("/videos/a.mp4"),
        Path::new("/out/a.mp4"),
        params,
    );
    cmd_to_string(&cmd)
}

#[test]
fn test_all_copy_is_a_remux() {
    let cmd = cmd_for(&TranscodeParameters::default());
    insta::assert_snapshot!(cmd, @"ffmpeg -hide_banner -y -i /videos/a.mp4 -threads 1 -c:v copy -c:a copy -progress pipe:1 -nostats /out/a.mp4");
}

#[test]
fn test_scale_rotate_fps_bitrate() {
    let params = TranscodeParameters {
        video_codec: "h264".into(),
        video_height: "720".into(),
        fps: "30".into(),
        video_bitrate: "1048576".into(),
        rotate: "90".into(),
        cpu_threads: 4,
        ..TranscodeParameters::default()
    };
    insta::assert_snapshot!(cmd_for(&params), @"ffmpeg -hide_banner -y -i /videos/a.mp4 -threads 4 -c:v libx264 -c:a copy -vf scale=-2:720,transpose=1 -r 30 -b:v 1048576 -progress pipe:1 -nostats /out/a.mp4");
}

#[test]
fn test_text_watermark_forces_reencode_on_gpu() {
    let params = TranscodeParameters {
        audio_codec: "mp3".into(),
        watermark_content: "Hello".into(),
        use_gpu: true,
        ..TranscodeParameters::default()
    };
    insta::assert_snapshot!(cmd_for(&params), @"ffmpeg -hide_banner -y -i /videos/a.mp4 -threads 1 -c:v h264_nvenc -c:a libmp3lame -vf drawtext=text='Hello':fontcolor=white:fontsize=24:x=w-tw-20:y=20:borderw=2:bordercolor=black -progress pipe:1 -nostats /out/a.mp4");
}

#[test]
fn test_image_watermark_uses_overlay_graph() {
    let params = TranscodeParameters {
        video_height: "480".into(),
        watermark_placement: "bounce".into(),
        ..TranscodeParameters::default()
    }
    .with_watermark_image(Path::new("/img/logo.png"));
    insta::assert_snapshot!(cmd_for(&params), @"ffmpeg -hide_banner -y -i /videos/a.mp4 -i /img/logo.png -threads 1 -c:v libx264 -c:a copy -filter_complex [0:v]scale=-2:480[base];[base][1:v]overlay=x=W/2+(W/3)*sin(2*PI*t/10):y=H/2+(H/3)*cos(2*PI*t/7)[vout] -map [vout] -map 0:a? -progress pipe:1 -nostats /out/a.mp4");
}

#[test]
fn test_image_watermark_without_other_filters() {
    let params = TranscodeParameters::default().with_watermark_image(Path::new("/img/logo.png"));
    let cmd = cmd_for(&params);
    assert_cmd_has_flag_value(
        &cmd,
        "-filter_complex",
        "[0:v][1:v]overlay=x=W-w-20:y=20[vout]",
    );
    assert_cmd_contains(&cmd, "-c:v libx264");
    assert_cmd_not_contains(&cmd, "-vf");
}

#[test]
fn test_h265_codec_mapping() {
    let mut params = TranscodeParameters {
        video_codec: "h265".into(),
        audio_codec: "aac".into(),
        ..TranscodeParameters::default()
    };
    let cmd = cmd_for(&params);
    assert_cmd_has_flag_value(&cmd, "-c:v", "libx265");
    assert_cmd_has_flag_value(&cmd, "-c:a", "aac");

    params.use_gpu = true;
    assert_cmd_has_flag_value(&cmd_for(&params), "-c:v", "hevc_nvenc");
}

#[test]
fn test_bitrate_alone_forces_reencode() {
    let params = TranscodeParameters {
        video_bitrate: "5242880".into(),
        ..TranscodeParameters::default()
    };
    let cmd = cmd_for(&params);
    assert_cmd_has_flag_value(&cmd, "-c:v", "libx264");
    assert_cmd_has_flag_value(&cmd, "-b:v", "5242880");
    assert_cmd_not_contains(&cmd, "-vf");
}

#[test]
fn test_rotations() {
    for (rotate, filter) in [
        ("180", "transpose=1,transpose=1"),
        ("270", "transpose=2"),
    ] {
        let params = TranscodeParameters {
            rotate: rotate.into(),
            ..TranscodeParameters::default()
        };
        assert_cmd_has_flag_value(&cmd_for(&params), "-vf", filter);
    }
}

#[test]
fn test_watermark_text_with_spaces_is_quoted_for_display() {
    let params = TranscodeParameters {
        watermark_content: "My Clip".into(),
        ..TranscodeParameters::default()
    };
    assert_cmd_contains(&cmd_for(&params), "\"drawtext=text='My Clip':");
}

#[test]
fn test_watermark_text_is_escaped() {
    let params = TranscodeParameters {
        watermark_content: "50%: a,b".into(),
        ..TranscodeParameters::default()
    };
    assert_cmd_contains(&cmd_for(&params), r"text='50\%\: a\,b'");
}

#[test]
fn test_motion_placements_escape_commas() {
    let random = placement_expr("random", "w", "h", "tw", "th");
    assert_eq!(
        random,
        r"x=if(lt(sin(t*0.5)\,0)\,20\,w-tw-20):y=if(lt(cos(t*0.3)\,0)\,20\,h-th-20)"
    );
    assert_eq!(
        placement_expr("diagonal", "W", "H", "w", "h"),
        "x=W*t/30:y=H*t/30"
    );
    for placement in ["horizontal", "bounce", "spiral"] {
        let expr = placement_expr(placement, "w", "h", "tw", "th");
        assert!(expr.starts_with("x=w/2+"), "{}", expr);
        assert!(!expr.contains(','), "{}", expr);
    }
}

#[test]
fn test_zero_threads_omits_flag() {
    let params = TranscodeParameters {
        cpu_threads: 0,
        ..TranscodeParameters::default()
    };
    assert_cmd_not_contains(&cmd_for(&params), "-threads");
}
