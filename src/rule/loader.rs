//! JSON规则源加载
//! 规则集可以作为结构化数据文档供给：字段定义 + 规则列表。
//! 本模块只做解析与结构校验，不是规则DSL——文档就是已解析的结构化数据。

use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use rsacl_engine::{AclRule, FieldConstraint, FieldDef, FieldLayout, RuleData};

use crate::error::{AclError, AclResult};

/// 规则源文档中的单条规则
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleSourceEntry {
    pub category_mask: u32,
    pub priority: i32,
    pub userdata: u32,
    pub fields: Vec<FieldConstraint>,
}

/// 规则源文档：字段定义 + 规则列表
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleSourceDoc {
    pub fields: Vec<FieldDef>,
    pub rules: Vec<RuleSourceEntry>,
}

impl From<RuleSourceEntry> for AclRule {
    fn from(entry: RuleSourceEntry) -> Self {
        AclRule {
            data: RuleData {
                category_mask: entry.category_mask,
                priority: entry.priority,
                userdata: entry.userdata,
            },
            fields: entry.fields,
        }
    }
}

/// 解析JSON规则源
/// 返回：(已校验的字段布局, 规则列表) | JSON解析错误 | 布局校验错误 | 规则形状错误
pub fn parse_rule_source(json: &str) -> AclResult<(Arc<FieldLayout>, Vec<AclRule>)> {
    let doc: RuleSourceDoc = serde_json::from_str(json)?;
    let layout = Arc::new(FieldLayout::new(doc.fields)?);
    // 文档内规则与自带布局的元数一致性在解析期就拒绝，不留到add_rules才暴露
    for (i, entry) in doc.rules.iter().enumerate() {
        if entry.fields.len() != layout.arity() {
            return Err(AclError::RuleSourceError(format!(
                "rule {} has {} field constraints, layout arity is {}",
                i,
                entry.fields.len(),
                layout.arity()
            )));
        }
    }
    let rules = doc.rules.into_iter().map(AclRule::from).collect();
    Ok((layout, rules))
}

/// 从文件加载JSON规则源
pub fn load_rule_source(path: impl AsRef<Path>) -> AclResult<(Arc<FieldLayout>, Vec<AclRule>)> {
    let json = fs::read_to_string(path.as_ref())?;
    log::debug!(
        "rule source loaded from {} ({} bytes)",
        path.as_ref().display(),
        json.len()
    );
    parse_rule_source(&json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AclError;
    use rsacl_engine::{EngineError, FieldKind};

    const SAMPLE: &str = r#"{
        "fields": [
            {"kind": "bitmask", "size": 1, "offset": 0, "field_index": 0, "group_index": 0},
            {"kind": "mask", "size": 2, "offset": 1, "field_index": 1, "group_index": 1}
        ],
        "rules": [
            {
                "category_mask": 3,
                "priority": 1,
                "userdata": 7,
                "fields": [
                    {"bitmask": {"value": 1, "mask": 255}},
                    {"prefix": {"value": 258, "len": 8}}
                ]
            }
        ]
    }"#;

    #[test]
    fn test_parse_sample_source() {
        let (layout, rules) = parse_rule_source(SAMPLE).unwrap();
        assert_eq!(layout.arity(), 2);
        assert_eq!(layout.defs()[1].kind, FieldKind::Mask);
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].data.userdata, 7);
        assert_eq!(
            rules[0].fields[1],
            FieldConstraint::Prefix { value: 258, len: 8 }
        );
    }

    #[test]
    fn test_parse_rejects_malformed_json() {
        let err = parse_rule_source("{not json").unwrap_err();
        assert!(matches!(err, AclError::JsonError(_)));
    }

    #[test]
    fn test_parse_rejects_invalid_layout() {
        // 字段宽度3非法：JSON合法但布局校验失败
        let json = r#"{
            "fields": [
                {"kind": "bitmask", "size": 3, "offset": 0, "field_index": 0, "group_index": 0}
            ],
            "rules": []
        }"#;
        let err = parse_rule_source(json).unwrap_err();
        assert!(matches!(
            err,
            AclError::Engine(EngineError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_parse_rejects_arity_mismatch_in_doc() {
        // 规则只带1个约束，布局元数为2
        let json = r#"{
            "fields": [
                {"kind": "bitmask", "size": 1, "offset": 0, "field_index": 0, "group_index": 0},
                {"kind": "bitmask", "size": 1, "offset": 1, "field_index": 1, "group_index": 1}
            ],
            "rules": [
                {
                    "category_mask": 1,
                    "priority": 1,
                    "userdata": 1,
                    "fields": [{"bitmask": {"value": 1, "mask": 255}}]
                }
            ]
        }"#;
        let err = parse_rule_source(json).unwrap_err();
        assert!(matches!(err, AclError::RuleSourceError(_)));
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = load_rule_source("/nonexistent/rsacl-rules.json").unwrap_err();
        assert!(matches!(err, AclError::IoError(_)));
    }

    #[test]
    fn test_round_trip_through_context() {
        use crate::config::{BuildOptions, ContextParam};
        use crate::context::AclContext;

        let (layout, rules) = parse_rule_source(SAMPLE).unwrap();
        let ctx = AclContext::new(&ContextParam::new("loader-e2e", layout.arity())).unwrap();
        ctx.add_rules(&rules).unwrap();
        ctx.build(&BuildOptions::new(layout.defs().to_vec(), 2))
            .unwrap();

        // 记录：字节0=1，偏移1起2字节大端=0x0102（命中prefix/8）
        let mut results = [0u32; 1];
        ctx.classify(&[&[1, 1, 2]], &mut results, 1).unwrap();
        assert_eq!(results, [7]);
    }
}
