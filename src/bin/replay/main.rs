//! 无窗口骨架回放
//!
//! 没有录制文件时使用站立姿态加左右摆动生成追踪帧。

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use glam::Vec3;

use choreo_rig::animation::FrameSequence;
use choreo_rig::physics::{get_config, set_config};
use choreo_rig::render::RecordingRenderer;
use choreo_rig::skeleton::{neutral_frame, Landmark, PushPreset, Skeleton};
use choreo_rig::Result;

#[derive(Parser, Debug)]
#[command(name = "rig_replay", about = "Headless replay of the tracked skeleton rig")]
struct Options {
    /// 追踪帧录制文件（RIGFRAME 格式）
    recording: Option<PathBuf>,
    /// 回放帧数（录制文件不足时循环）
    #[arg(long, default_value_t = 300)]
    frames: usize,
    /// 在该帧触发跌倒
    #[arg(long)]
    fall_at: Option<usize>,
    /// 绘制原始追踪点叠加层
    #[arg(long)]
    overlay: bool,
    /// 把使用的帧序列写出到文件
    #[arg(long)]
    save: Option<PathBuf>,
}

/// 站立姿态整体左右摆动
fn sway_sequence(frames: usize) -> Result<FrameSequence> {
    let base = neutral_frame();
    let mut sequence = FrameSequence::new();
    for i in 0..frames {
        let phase = i as f32 / 30.0 * std::f32::consts::TAU;
        let shift = Vec3::new(phase.sin() * 15.0, 0.0, 0.0);
        sequence.push(base.iter().map(|p| *p + shift).collect())?;
    }
    Ok(sequence)
}

fn run(options: Options) -> Result<()> {
    let sequence = match &options.recording {
        Some(path) => FrameSequence::load(path)?,
        None => sway_sequence(options.frames.max(1))?,
    };
    let Some(first) = sequence.frame(0) else {
        log::warn!("录制文件没有任何帧");
        return Ok(());
    };

    if let Some(path) = &options.save {
        sequence.save(path)?;
        log::info!("已写出 {} 帧到 {}", sequence.len(), path.display());
    }

    let mut config = get_config();
    config.debug_log = true;
    set_config(config);

    let mut skeleton = Skeleton::new(first)?;
    let mut renderer = RecordingRenderer::new();

    for i in 0..options.frames {
        if options.fall_at == Some(i) {
            log::info!("第 {} 帧: 触发跌倒", i);
            skeleton.push(PushPreset::Fall, Vec3::ZERO);
        }
        if let Some(frame) = sequence.frame_looped(i) {
            skeleton.update(frame)?;
        }

        renderer.clear();
        skeleton.render(&mut renderer, options.overlay);
    }

    log::info!(
        "回放完成: {} 帧, 最后一帧 {} 条线 / {} 个立方体, 骨骼约束力合计 {:.3}",
        options.frames,
        renderer.line_count(),
        renderer.cube_count(),
        skeleton.net_bone_force()
    );
    for landmark in Landmark::ALL {
        let joint = skeleton.joint(landmark);
        log::info!(
            "{:>10}: 位置 {:?} 追踪 {:?} offset {:?}",
            joint.name,
            joint.position,
            skeleton.landmark(landmark),
            joint.offset
        );
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let options = Options::parse();

    match run(options) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("回放失败: {}", e);
            ExitCode::FAILURE
        }
    }
}
