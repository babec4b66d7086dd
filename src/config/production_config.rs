// ==========================================
// 瓶装产线排产系统 - 产线配置
// ==========================================
// 每种产品一条产线: 固定产能 (件/小时) + 固定单耗向量
// 红线: 进程内不可变; 以值注入引擎, 不使用全局常量
// ==========================================

use crate::config::error::{ConfigError, ConfigResult};
use crate::domain::timestamp::hours_to_duration;
use crate::domain::types::{MaterialAmounts, ProductType};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ==========================================
// ProductLineConfig - 单条产线配置
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductLineConfig {
    pub line: String,                          // 产线名称
    #[serde(rename = "ratePerHour")]
    pub rate_per_hour: f64,                    // 产能 (件/小时)
    #[serde(rename = "materialsPerUnit")]
    pub materials_per_unit: MaterialAmounts,   // 单件原料消耗
}

impl ProductLineConfig {
    /// 订单原料需求 = 数量 × 单耗
    pub fn required_materials(&self, quantity: i64) -> MaterialAmounts {
        self.materials_per_unit.scaled(quantity as f64)
    }

    /// 订单生产时长 = 数量 / 产能 (小时)；超出可表示范围返回 None
    pub fn production_duration(&self, quantity: i64) -> Option<Duration> {
        hours_to_duration(quantity as f64 / self.rate_per_hour)
    }

    fn validate(&self, product_type: ProductType) -> ConfigResult<()> {
        if !self.rate_per_hour.is_finite() || self.rate_per_hour <= 0.0 {
            return Err(ConfigError::InvalidLine {
                product_type: product_type.to_string(),
                reason: format!("ratePerHour 必须为正数，实际={}", self.rate_per_hour),
            });
        }
        for (material, amount) in self.materials_per_unit.iter() {
            if !amount.is_finite() || amount < 0.0 {
                return Err(ConfigError::InvalidLine {
                    product_type: product_type.to_string(),
                    reason: format!("{} 单耗不能为负数，实际={}", material, amount),
                });
            }
        }
        Ok(())
    }
}

// ==========================================
// ProductionConfig - 全部产线配置
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct ProductionConfig {
    lines: [ProductLineConfig; ProductType::COUNT],
}

impl ProductionConfig {
    /// 由按产品类型索引的配置构造（每条产线都必须给出）
    pub fn new(mut lines: HashMap<ProductType, ProductLineConfig>) -> ConfigResult<Self> {
        let mut take = |pt: ProductType| -> ConfigResult<ProductLineConfig> {
            let line = lines
                .remove(&pt)
                .ok_or_else(|| ConfigError::MissingLine(pt.to_string()))?;
            line.validate(pt)?;
            Ok(line)
        };

        Ok(Self {
            lines: [take(ProductType::Liter)?, take(ProductType::Gallon)?],
        })
    }

    /// 从 JSON 解析（格式: {"liter": {...}, "gallon": {...}}）
    pub fn from_json(raw: &str) -> ConfigResult<Self> {
        let lines: HashMap<ProductType, ProductLineConfig> = serde_json::from_str(raw)?;
        Self::new(lines)
    }

    /// 查询产线配置
    pub fn line(&self, product_type: ProductType) -> &ProductLineConfig {
        &self.lines[product_type.index()]
    }

    /// 序列化为 JSON map
    pub fn to_json(&self) -> ConfigResult<String> {
        let map: HashMap<ProductType, &ProductLineConfig> =
            ProductType::ALL.iter().map(|pt| (*pt, self.line(*pt))).collect();
        Ok(serde_json::to_string(&map)?)
    }
}

impl Default for ProductionConfig {
    fn default() -> Self {
        Self {
            lines: [
                ProductLineConfig {
                    line: "1L Line".to_string(),
                    rate_per_hour: 2000.0,
                    materials_per_unit: MaterialAmounts::new(20.0, 15.0, 10.0),
                },
                ProductLineConfig {
                    line: "1G Line".to_string(),
                    rate_per_hour: 1500.0,
                    materials_per_unit: MaterialAmounts::new(65.0, 45.0, 20.0),
                },
            ],
        }
    }
}
