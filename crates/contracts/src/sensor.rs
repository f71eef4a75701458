//! 传感器数据类型
//!
//! 点云、距离图像、惯导数据包与参考位姿。

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// LiDAR 点 (x, y, z, reflectance)
///
/// 内存布局与 KITTI `.bin` 文件一致：4 个小端 f32。
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub reflectance: f32,
}

/// LiDAR 点云 (一帧扫描)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PointCloud {
    pub points: Vec<Point>,
}

impl PointCloud {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// 距离图像通道
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeChannel {
    X = 0,
    Y = 1,
    Z = 2,
    Remission = 3,
    Range = 4,
}

impl RangeChannel {
    pub const ALL: [RangeChannel; 5] = [
        RangeChannel::X,
        RangeChannel::Y,
        RangeChannel::Z,
        RangeChannel::Remission,
        RangeChannel::Range,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::X => "x",
            Self::Y => "y",
            Self::Z => "z",
            Self::Remission => "remission",
            Self::Range => "range",
        }
    }
}

/// 距离图像 (球面投影)
///
/// HWC 布局，每像素 5 个通道 (x, y, z, remission, range)。
/// 没有点落入的像素所有通道为 [`RangeImage::EMPTY`]。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeImage {
    /// 图像宽度 (方位角方向)
    pub width: u32,

    /// 图像高度 (俯仰角方向)
    pub height: u32,

    /// 像素数据，长度 = width * height * CHANNELS
    pub data: Vec<f32>,
}

impl RangeImage {
    pub const CHANNELS: usize = 5;

    /// 空像素填充值
    pub const EMPTY: f32 = -1.0;

    /// 创建全空图像
    pub fn empty(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![Self::EMPTY; width as usize * height as usize * Self::CHANNELS],
        }
    }

    /// (height, width, channels)
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.height as usize, self.width as usize, Self::CHANNELS)
    }

    #[inline]
    fn offset(&self, row: usize, col: usize) -> usize {
        (row * self.width as usize + col) * Self::CHANNELS
    }

    /// 读取单个像素
    pub fn pixel(&self, row: usize, col: usize) -> [f32; Self::CHANNELS] {
        let o = self.offset(row, col);
        let mut px = [0.0; Self::CHANNELS];
        px.copy_from_slice(&self.data[o..o + Self::CHANNELS]);
        px
    }

    /// 写入单个像素
    pub fn set_pixel(&mut self, row: usize, col: usize, px: [f32; Self::CHANNELS]) {
        let o = self.offset(row, col);
        self.data[o..o + Self::CHANNELS].copy_from_slice(&px);
    }

    /// 提取单通道 (行优先)
    pub fn channel(&self, channel: RangeChannel) -> Vec<f32> {
        self.data
            .chunks_exact(Self::CHANNELS)
            .map(|px| px[channel as usize])
            .collect()
    }

    /// 有效 (被点命中) 像素数量
    pub fn valid_pixels(&self) -> usize {
        self.data
            .chunks_exact(Self::CHANNELS)
            .filter(|px| px[RangeChannel::Range as usize] >= 0.0)
            .count()
    }
}

/// 3D 向量
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    pub const ZERO: Vector3 = Vector3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// IMU 读数：加速度 + 角速度
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ImuReading {
    /// 加速度计 (m/s²)：ax, ay, az
    pub accelerometer: Vector3,

    /// 陀螺仪 (rad/s)：wx, wy, wz
    pub gyroscope: Vector3,
}

impl ImuReading {
    pub const ZERO: ImuReading = ImuReading {
        accelerometer: Vector3::ZERO,
        gyroscope: Vector3::ZERO,
    };

    /// [ax, ay, az, wx, wy, wz]
    pub fn to_array(&self) -> [f64; 6] {
        let a = self.accelerometer;
        let w = self.gyroscope;
        [a.x, a.y, a.z, w.x, w.y, w.z]
    }
}

/// 参考位姿 T_w_imu (世界系 ← IMU 系)
///
/// 4x4 齐次矩阵，行优先展开。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub matrix: [f64; 16],
}

impl Pose {
    pub const IDENTITY: Pose = Pose {
        matrix: [
            1.0, 0.0, 0.0, 0.0, //
            0.0, 1.0, 0.0, 0.0, //
            0.0, 0.0, 1.0, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        ],
    };

    pub fn from_row_major(matrix: [f64; 16]) -> Self {
        Self { matrix }
    }

    /// 平移分量
    pub fn translation(&self) -> Vector3 {
        Vector3::new(self.matrix[3], self.matrix[7], self.matrix[11])
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// OXTS 数据包 (GPS/IMU 单帧，30 个字段)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct OxtsPacket {
    /// 纬度 (度)
    pub lat: f64,
    /// 经度 (度)
    pub lon: f64,
    /// 海拔 (米)
    pub alt: f64,
    /// 横滚角 (rad)
    pub roll: f64,
    /// 俯仰角 (rad)
    pub pitch: f64,
    /// 航向角 (rad)
    pub yaw: f64,
    pub vn: f64,
    pub ve: f64,
    pub vf: f64,
    pub vl: f64,
    pub vu: f64,
    /// 车体系加速度 (m/s²)
    pub ax: f64,
    pub ay: f64,
    pub az: f64,
    pub af: f64,
    pub al: f64,
    pub au: f64,
    /// 车体系角速度 (rad/s)
    pub wx: f64,
    pub wy: f64,
    pub wz: f64,
    pub wf: f64,
    pub wl: f64,
    pub wu: f64,
    pub pos_accuracy: f64,
    pub vel_accuracy: f64,
    pub navstat: i32,
    pub numsats: i32,
    pub posmode: i32,
    pub velmode: i32,
    pub orimode: i32,
}

impl OxtsPacket {
    /// 字段数量
    pub const FIELDS: usize = 30;

    /// 提取 6 维运动向量
    pub fn imu_reading(&self) -> ImuReading {
        ImuReading {
            accelerometer: Vector3::new(self.ax, self.ay, self.az),
            gyroscope: Vector3::new(self.wx, self.wy, self.wz),
        }
    }
}

/// 单个惯导样本解码结果：读数 + 参考位姿
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InertialMeasurement {
    pub reading: ImuReading,
    pub pose: Pose,
}
