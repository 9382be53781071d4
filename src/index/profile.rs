//! Declarative persistence of the symbol table, so a configuration profile can
//! reload scan results without rescanning the project.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::io::BufWriter;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

use super::{ClassInfo, FieldInfo, MethodInfo, SymbolTable};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableDoc {
    pub classes: Vec<ClassDoc>,
    #[serde(default)]
    pub roots: Vec<RootDoc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_root: Option<String>,
    #[serde(default = "default_suffix")]
    pub function_suffix: String,
}

fn default_suffix() -> String {
    "Functions".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassDoc {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qualified_name: Option<String>,
    #[serde(default)]
    pub fields: Vec<FieldDoc>,
    #[serde(default)]
    pub methods: Vec<MethodDoc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDoc {
    pub name: String,
    #[serde(rename = "type")]
    pub declared_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodDoc {
    pub name: String,
    #[serde(default)]
    pub params: Vec<String>,
    #[serde(default = "default_return")]
    pub return_type: String,
}

fn default_return() -> String {
    "void".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RootDoc {
    pub name: String,
    pub class: String,
}

pub fn to_doc(table: &SymbolTable) -> TableDoc {
    let classes = table
        .classes()
        .into_iter()
        .map(|class| {
            let mut fields: Vec<FieldDoc> = class
                .fields
                .values()
                .map(|f| FieldDoc {
                    name: f.name.to_string(),
                    declared_type: f.declared_type.to_string(),
                })
                .collect();
            fields.sort_by(|a, b| a.name.cmp(&b.name));

            let mut methods: Vec<MethodDoc> = class
                .methods
                .values()
                .flatten()
                .map(|m| MethodDoc {
                    name: m.name.to_string(),
                    params: m.parameter_types.iter().map(|p| p.to_string()).collect(),
                    return_type: m.return_type.to_string(),
                })
                .collect();
            methods.sort_by(|a, b| a.name.cmp(&b.name).then(a.params.len().cmp(&b.params.len())));

            ClassDoc {
                name: class.name.to_string(),
                qualified_name: (class.qualified_name != class.name)
                    .then(|| class.qualified_name.to_string()),
                fields,
                methods,
            }
        })
        .collect();

    let mut roots: Vec<RootDoc> = table
        .roots()
        .map(|(name, class)| RootDoc {
            name: name.to_string(),
            class: class.to_string(),
        })
        .collect();
    roots.sort_by(|a, b| a.name.cmp(&b.name));

    TableDoc {
        classes,
        roots,
        default_root: table.default_root().map(str::to_string),
        function_suffix: table.function_suffix().to_string(),
    }
}

pub fn from_doc(doc: &TableDoc) -> SymbolTable {
    let mut table = SymbolTable::new(&doc.function_suffix);
    for class in &doc.classes {
        let qualified = class.qualified_name.as_deref().unwrap_or(&class.name);
        let fields = class
            .fields
            .iter()
            .map(|f| FieldInfo {
                name: Arc::from(f.name.as_str()),
                declared_type: Arc::from(f.declared_type.as_str()),
            })
            .collect();
        let methods = class
            .methods
            .iter()
            .map(|m| MethodInfo {
                name: Arc::from(m.name.as_str()),
                return_type: Arc::from(m.return_type.as_str()),
                parameter_types: m.params.iter().map(|p| Arc::from(p.as_str())).collect(),
            })
            .collect();
        table.add_class(ClassInfo::new(
            class.name.as_str(),
            qualified,
            fields,
            methods,
            class.name.ends_with(&doc.function_suffix),
        ));
    }
    for root in &doc.roots {
        table.bind_root(&root.name, &root.class);
    }
    if let Some(default) = &doc.default_root {
        table.set_default_root(default);
    }
    table.build_function_root();
    table
}

pub fn save_profile(path: &Path, table: &SymbolTable) -> anyhow::Result<()> {
    let doc = to_doc(table);
    let file = std::fs::File::create(path)
        .with_context(|| format!("create profile {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), &doc)
        .with_context(|| format!("write profile {}", path.display()))?;
    debug!(path = %path.display(), classes = doc.classes.len(), "profile saved");
    Ok(())
}

pub fn load_profile(path: &Path) -> anyhow::Result<SymbolTable> {
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("read profile {}", path.display()))?;
    let doc: TableDoc = serde_json::from_str(&data)
        .with_context(|| format!("parse profile {}", path.display()))?;
    debug!(path = %path.display(), classes = doc.classes.len(), "profile loaded");
    Ok(from_doc(&doc))
}
