// ==========================================
// 瓶装产线排产系统 - 领域类型定义
// ==========================================
// 产品类型 / 原料 / 生产状态 / 到货状态 / 排产预测状态
// 序列化格式: snake_case (与数据库、前端一致)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Index, IndexMut};

// ==========================================
// 产品类型 (Product Type)
// ==========================================
// 每个产品类型对应一条固定产线
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductType {
    Liter,  // 1L 瓶
    Gallon, // 1 加仑瓶
}

impl ProductType {
    /// 全部产品类型（固定顺序）
    pub const ALL: [ProductType; 2] = [ProductType::Liter, ProductType::Gallon];

    /// 产品类型数量
    pub const COUNT: usize = 2;

    /// 在固定数组中的下标
    pub fn index(self) -> usize {
        match self {
            ProductType::Liter => 0,
            ProductType::Gallon => 1,
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            ProductType::Liter => "liter",
            ProductType::Gallon => "gallon",
        }
    }

    /// 从字符串解析（未知值返回 None）
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "liter" => Some(ProductType::Liter),
            "gallon" => Some(ProductType::Gallon),
            _ => None,
        }
    }
}

impl fmt::Display for ProductType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// 原料 (Material)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Material {
    Pet, // 聚酯切片
    Pta, // 精对苯二甲酸
    Eg,  // 乙二醇
}

impl Material {
    /// 全部原料（固定顺序）
    pub const ALL: [Material; 3] = [Material::Pet, Material::Pta, Material::Eg];

    /// 原料数量
    pub const COUNT: usize = 3;

    pub fn index(self) -> usize {
        match self {
            Material::Pet => 0,
            Material::Pta => 1,
            Material::Eg => 2,
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            Material::Pet => "pet",
            Material::Pta => "pta",
            Material::Eg => "eg",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pet" => Some(Material::Pet),
            "pta" => Some(Material::Pta),
            "eg" => Some(Material::Eg),
            _ => None,
        }
    }
}

impl fmt::Display for Material {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// 原料数量向量 (Material Amounts)
// ==========================================
// 按原料固定下标存储，序列化为 {"pet":..,"pta":..,"eg":..}
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "MaterialAmountsRepr", into = "MaterialAmountsRepr")]
pub struct MaterialAmounts([f64; Material::COUNT]);

impl MaterialAmounts {
    /// 全零向量
    pub fn zero() -> Self {
        Self([0.0; Material::COUNT])
    }

    /// 按原料构造
    pub fn new(pet: f64, pta: f64, eg: f64) -> Self {
        Self([pet, pta, eg])
    }

    /// 单一原料向量
    pub fn single(material: Material, amount: f64) -> Self {
        let mut amounts = Self::zero();
        amounts[material] = amount;
        amounts
    }

    /// 整体缩放（数量 × 单耗）
    pub fn scaled(&self, factor: f64) -> Self {
        let mut out = *self;
        for v in out.0.iter_mut() {
            *v *= factor;
        }
        out
    }

    /// 所有分量均 <= 0
    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|v| *v <= 0.0)
    }

    /// 遍历 (原料, 数量)
    pub fn iter(&self) -> impl Iterator<Item = (Material, f64)> + '_ {
        Material::ALL.iter().map(move |m| (*m, self[*m]))
    }
}

impl Index<Material> for MaterialAmounts {
    type Output = f64;

    fn index(&self, material: Material) -> &f64 {
        &self.0[material.index()]
    }
}

impl IndexMut<Material> for MaterialAmounts {
    fn index_mut(&mut self, material: Material) -> &mut f64 {
        &mut self.0[material.index()]
    }
}

#[derive(Serialize, Deserialize)]
struct MaterialAmountsRepr {
    #[serde(default)]
    pet: f64,
    #[serde(default)]
    pta: f64,
    #[serde(default)]
    eg: f64,
}

impl From<MaterialAmountsRepr> for MaterialAmounts {
    fn from(r: MaterialAmountsRepr) -> Self {
        MaterialAmounts::new(r.pet, r.pta, r.eg)
    }
}

impl From<MaterialAmounts> for MaterialAmountsRepr {
    fn from(a: MaterialAmounts) -> Self {
        MaterialAmountsRepr {
            pet: a[Material::Pet],
            pta: a[Material::Pta],
            eg: a[Material::Eg],
        }
    }
}

// ==========================================
// 生产状态 (Production Status)
// ==========================================
// 状态流转: pending -> in_production -> completed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductionStatus {
    Pending,      // 待生产
    InProduction, // 生产中
    Completed,    // 已完成
}

impl ProductionStatus {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            ProductionStatus::Pending => "pending",
            ProductionStatus::InProduction => "in_production",
            ProductionStatus::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "pending" => Some(ProductionStatus::Pending),
            "in_production" => Some(ProductionStatus::InProduction),
            "completed" => Some(ProductionStatus::Completed),
            _ => None,
        }
    }
}

impl fmt::Display for ProductionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// 到货状态 (Supply Order Status)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SupplyStatus {
    Ordered,  // 在途
    Received, // 已入库
}

impl SupplyStatus {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            SupplyStatus::Ordered => "ordered",
            SupplyStatus::Received => "received",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "ordered" => Some(SupplyStatus::Ordered),
            "received" => Some(SupplyStatus::Received),
            _ => None,
        }
    }
}

impl fmt::Display for SupplyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// 排产预测状态 (Schedule Status)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleStatus {
    OnTrack,         // 库存足够，按产线空闲时间开工
    DelayExpected,   // 需等在途原料到货
    UnableToFulfill, // 库存 + 在途均不足（或产线已阻断）
}

impl fmt::Display for ScheduleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScheduleStatus::OnTrack => write!(f, "on_track"),
            ScheduleStatus::DelayExpected => write!(f, "delay_expected"),
            ScheduleStatus::UnableToFulfill => write!(f, "unable_to_fulfill"),
        }
    }
}
