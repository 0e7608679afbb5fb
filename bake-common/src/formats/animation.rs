//! Baked animation clip format (.anim)
//!
//! Joint global transforms sampled at a fixed 24 frames per second.
//! POD format with minimal header - no magic bytes.
//!
//! # Layout
//! ```text
//! Header (12 bytes):
//! 0x00: duration f64         - Frame span, inclusive of both endpoints
//! 0x08: frame_count i32      - Number of keyframes that follow
//!
//! Per keyframe:
//! 0x00: time f64             - Seconds
//! 0x08: joints (joint_count × 132 bytes)
//! ```
//!
//! Each joint record:
//! ```text
//! 0x00: global_xform  [f32; 16]
//! 0x40: inverse_xform [f32; 16]
//! 0x80: parent_index  i32      (-1 for the root)
//! ```
//!
//! Matrices store the basis vectors first and the translation in elements
//! 12..15. The joint count is not stored; it is implied by the payload size.

use std::io::{self, Write};

use bytemuck::{Pod, Zeroable};

use super::serialization::{read_words_le, write_words_le};

/// Fixed sampling rate of baked clips
pub const FRAMES_PER_SECOND: f64 = 24.0;

const IDENTITY: [f32; 16] = [
    1.0, 0.0, 0.0, 0.0, //
    0.0, 1.0, 0.0, 0.0, //
    0.0, 0.0, 1.0, 0.0, //
    0.0, 0.0, 0.0, 1.0,
];

/// Animation clip header (12 bytes)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationHeader {
    pub duration: f64,
    pub frame_count: i32,
}

impl AnimationHeader {
    pub const SIZE: usize = 12;

    pub fn new(duration: f64, frame_count: i32) -> Self {
        Self {
            duration,
            frame_count,
        }
    }

    /// Write header to bytes
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0..8].copy_from_slice(&self.duration.to_le_bytes());
        bytes[8..12].copy_from_slice(&self.frame_count.to_le_bytes());
        bytes
    }

    /// Read header from bytes
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SIZE {
            return None;
        }
        let mut duration = [0u8; 8];
        duration.copy_from_slice(&bytes[0..8]);
        Some(Self {
            duration: f64::from_le_bytes(duration),
            frame_count: i32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]),
        })
    }
}

/// One joint in one keyframe (132 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct JointPose {
    pub global_xform: [f32; 16],
    pub inverse_xform: [f32; 16],
    pub parent_index: i32,
}

impl Default for JointPose {
    fn default() -> Self {
        Self {
            global_xform: IDENTITY,
            inverse_xform: IDENTITY,
            parent_index: -1,
        }
    }
}

impl JointPose {
    pub const SIZE: usize = 132;

    /// Write joint to bytes
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        write_words_le(self, &mut bytes);
        bytes
    }

    /// Read joint from bytes
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        read_words_le(bytes)
    }

    /// Translation column of the global transform
    pub fn translation(&self) -> [f32; 3] {
        [
            self.global_xform[12],
            self.global_xform[13],
            self.global_xform[14],
        ]
    }
}

/// One sampled instant of a clip
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Keyframe {
    /// Seconds
    pub time: f64,
    /// One pose per joint in canonical joint order
    pub joints: Vec<JointPose>,
}

impl Keyframe {
    pub fn byte_size(&self) -> usize {
        8 + self.joints.len() * JointPose::SIZE
    }
}

/// A baked animation clip
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnimationClip {
    /// Frame span, inclusive of both endpoints
    pub duration: f64,
    pub frames: Vec<Keyframe>,
}

impl AnimationClip {
    /// Number of keyframes, as stored in the header
    pub fn frame_count(&self) -> i32 {
        self.frames.len() as i32
    }

    /// Joints per keyframe (0 for an empty clip)
    pub fn joint_count(&self) -> usize {
        self.frames.first().map_or(0, |f| f.joints.len())
    }

    pub fn header(&self) -> AnimationHeader {
        AnimationHeader::new(self.duration, self.frame_count())
    }

    /// Total encoded size in bytes
    pub fn byte_size(&self) -> usize {
        AnimationHeader::SIZE + self.frames.iter().map(Keyframe::byte_size).sum::<usize>()
    }

    /// Write a complete animation file
    ///
    /// The header frame count is always taken from the frames actually present.
    pub fn write_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        let joint_count = self.joint_count();
        if let Some(frame) = self.frames.iter().find(|f| f.joints.len() != joint_count) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "Keyframe at {}s has {} joints, expected {}",
                    frame.time,
                    frame.joints.len(),
                    joint_count
                ),
            ));
        }

        w.write_all(&self.header().to_bytes())?;
        for frame in &self.frames {
            w.write_all(&frame.time.to_le_bytes())?;
            for joint in &frame.joints {
                w.write_all(&joint.to_bytes())?;
            }
        }
        Ok(())
    }

    /// Encode into an in-memory buffer
    pub fn to_bytes(&self) -> io::Result<Vec<u8>> {
        let mut bytes = Vec::with_capacity(self.byte_size());
        self.write_to(&mut bytes)?;
        Ok(bytes)
    }

    /// Decode a complete animation file, inferring the joint count from the
    /// payload size.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let header = AnimationHeader::from_bytes(bytes)?;
        let frame_count = usize::try_from(header.frame_count).ok()?;
        if frame_count == 0 {
            return Some(Self {
                duration: header.duration,
                frames: Vec::new(),
            });
        }

        let payload = bytes.len() - AnimationHeader::SIZE;
        if payload % frame_count != 0 {
            return None;
        }
        let per_frame = payload / frame_count;
        if per_frame < 8 || (per_frame - 8) % JointPose::SIZE != 0 {
            return None;
        }
        Self::from_bytes_with_joints(bytes, (per_frame - 8) / JointPose::SIZE)
    }

    /// Decode a complete animation file with a known joint count
    pub fn from_bytes_with_joints(bytes: &[u8], joint_count: usize) -> Option<Self> {
        let header = AnimationHeader::from_bytes(bytes)?;
        let frame_count = usize::try_from(header.frame_count).ok()?;
        let mut offset = AnimationHeader::SIZE;

        let mut frames = Vec::with_capacity(frame_count.min(bytes.len() / 8));
        for _ in 0..frame_count {
            let time_bytes = bytes.get(offset..offset + 8)?;
            let mut raw = [0u8; 8];
            raw.copy_from_slice(time_bytes);
            offset += 8;

            let mut joints = Vec::with_capacity(joint_count);
            for _ in 0..joint_count {
                joints.push(JointPose::from_bytes(bytes.get(offset..)?)?);
                offset += JointPose::SIZE;
            }
            frames.push(Keyframe {
                time: f64::from_le_bytes(raw),
                joints,
            });
        }

        Some(Self {
            duration: header.duration,
            frames,
        })
    }
}
