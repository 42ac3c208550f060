// ==========================================
// Layup 排产系统 - 模具兼容性索引
// ==========================================
// 输入: 订单款式ID + 启用模具列表
// 输出: 可生产该款式的模具子集 (按模具列表插入顺序)
// 红线: 归一化后严格相等匹配，禁止子串/前缀/“通用模具”回退
// 红线: Mesa Universal 系列只匹配明确声明 mesa_universal 的模具
// ==========================================

use crate::domain::mold::Mold;

/// Mesa Universal 系列的归一化标识
pub const MESA_UNIVERSAL: &str = "mesa_universal";

/// 款式ID归一化
///
/// 规则 (逐字符，不合并连续分隔符，不去首尾):
/// 1) 转小写
/// 2) 每个空白字符 -> '_'
/// 3) 每个 '-' -> '_'
pub fn normalize_stock_model(raw: &str) -> String {
    raw.chars()
        .flat_map(char::to_lowercase)
        .map(|c| if c.is_whitespace() || c == '-' { '_' } else { c })
        .collect()
}

/// 归一化款式是否属于 Mesa Universal 系列
pub fn is_mesa_universal(normalized: &str) -> bool {
    normalized.contains(MESA_UNIVERSAL) || normalized.contains("mesauniversal")
}

// ==========================================
// CompatibilityIndex - 兼容性索引
// ==========================================
// 构建时对模具声明的款式做一次归一化，查询时只做相等比较
pub struct CompatibilityIndex<'a> {
    entries: Vec<(&'a Mold, Vec<String>)>,
}

impl<'a> CompatibilityIndex<'a> {
    /// 从模具列表构建索引 (仅启用模具，保持插入顺序)
    pub fn build(molds: &'a [Mold]) -> Self {
        let entries = molds
            .iter()
            .filter(|m| m.active)
            .map(|m| {
                let models = m
                    .compatible_stock_models
                    .iter()
                    .map(|s| normalize_stock_model(s))
                    .collect();
                (m, models)
            })
            .collect();

        Self { entries }
    }

    /// 启用模具 (索引顺序)
    pub fn active_molds(&self) -> impl Iterator<Item = &'a Mold> + '_ {
        self.entries.iter().map(|(m, _)| *m)
    }

    pub fn active_mold_count(&self) -> usize {
        self.entries.len()
    }

    /// 查询款式的兼容模具
    pub fn compatible_molds(&self, stock_model_id: &str) -> Vec<&'a Mold> {
        let normalized = normalize_stock_model(stock_model_id);
        let token: &str = if is_mesa_universal(&normalized) {
            MESA_UNIVERSAL
        } else {
            &normalized
        };

        self.entries
            .iter()
            .filter(|(_, models)| models.iter().any(|m| m == token))
            .map(|(m, _)| *m)
            .collect()
    }

    /// 指定模具是否可生产该款式
    pub fn is_compatible(&self, stock_model_id: &str, mold_id: &str) -> bool {
        self.compatible_molds(stock_model_id)
            .iter()
            .any(|m| m.mold_id == mold_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(molds: &[&Mold]) -> Vec<String> {
        molds.iter().map(|m| m.mold_id.clone()).collect()
    }

    #[test]
    fn test_normalize_rules() {
        assert_eq!(normalize_stock_model("CF-Classic"), "cf_classic");
        assert_eq!(normalize_stock_model("Mesa Universal"), "mesa_universal");
        assert_eq!(normalize_stock_model("fg_alpine_hunter"), "fg_alpine_hunter");
        // 逐字符替换，连续分隔符不合并
        assert_eq!(normalize_stock_model("cf - classic"), "cf___classic");
        assert_eq!(normalize_stock_model("cf\tclassic"), "cf_classic");
        assert_eq!(normalize_stock_model(" cf"), "_cf");
        assert_eq!(normalize_stock_model(""), "");
    }

    #[test]
    fn test_exact_match_only() {
        let molds = vec![
            Mold::new("M1", &["cf_classic"], 2),
            Mold::new("M2", &["cf_classic_lh"], 1),
            Mold::new("M3", &["CF Classic"], 1),
        ];
        let index = CompatibilityIndex::build(&molds);

        // 不允许前缀匹配到 cf_classic_lh
        assert_eq!(ids(&index.compatible_molds("cf_classic")), vec!["M1", "M3"]);
        assert_eq!(ids(&index.compatible_molds("CF-CLASSIC")), vec!["M1", "M3"]);
        assert!(index.compatible_molds("cf").is_empty());
        assert!(index.compatible_molds("classic").is_empty());
    }

    #[test]
    fn test_mesa_universal_exclusivity() {
        let molds = vec![
            Mold::new("GEN", &["cf_classic", "universal"], 3),
            Mold::new("MESA", &["Mesa Universal"], 1),
            Mold::new("MIX", &["mesa_universal_lh"], 1),
        ];
        let index = CompatibilityIndex::build(&molds);

        assert_eq!(ids(&index.compatible_molds("mesa_universal")), vec!["MESA"]);
        assert_eq!(ids(&index.compatible_molds("Mesa-Universal")), vec!["MESA"]);
        // 系列成员也只认 mesa_universal 模具
        assert_eq!(ids(&index.compatible_molds("mesa_universal_lh")), vec!["MESA"]);
        // 普通款式不会回退到“通用”模具
        assert_eq!(ids(&index.compatible_molds("cf_classic")), vec!["GEN"]);
        assert!(index.compatible_molds("fg_hunter").is_empty());
    }

    #[test]
    fn test_inactive_molds_excluded_and_order_preserved() {
        let mut inactive = Mold::new("M0", &["cf_classic"], 1);
        inactive.active = false;
        let molds = vec![
            inactive,
            Mold::new("M2", &["cf_classic"], 1),
            Mold::new("M1", &["cf_classic"], 1),
        ];
        let index = CompatibilityIndex::build(&molds);

        assert_eq!(index.active_mold_count(), 2);
        assert_eq!(ids(&index.compatible_molds("cf_classic")), vec!["M2", "M1"]);
        assert!(!index.is_compatible("cf_classic", "M0"));
    }

    #[test]
    fn test_repeated_lookup_is_stable() {
        let molds = vec![
            Mold::new("M1", &["cf_classic"], 1),
            Mold::new("M2", &["cf_classic"], 1),
        ];
        let index = CompatibilityIndex::build(&molds);
        let first = ids(&index.compatible_molds("cf_classic"));
        for _ in 0..5 {
            assert_eq!(ids(&index.compatible_molds("cf_classic")), first);
        }
    }
}
