use rustc_hash::{FxHashMap, FxHashSet};
use std::sync::Arc;

pub mod profile;
pub mod scanner;
pub mod source;

/// One indexed class or interface. Immutable once a scan completes; shared as
/// `Arc<ClassInfo>` owned by the [`SymbolTable`].
#[derive(Clone, Debug, PartialEq)]
pub struct ClassInfo {
    pub name: Arc<str>,
    pub qualified_name: Arc<str>,
    pub fields: FxHashMap<Arc<str>, FieldInfo>,
    /// Methods keyed by name; the vector holds overloads.
    pub methods: FxHashMap<Arc<str>, Vec<MethodInfo>>,
    /// Class name ends with the configured function suffix; its methods feed
    /// the `#fn` namespace.
    pub is_function_class: bool,
}

impl ClassInfo {
    pub fn new(
        name: impl Into<Arc<str>>,
        qualified_name: impl Into<Arc<str>>,
        fields: Vec<FieldInfo>,
        methods: Vec<MethodInfo>,
        is_function_class: bool,
    ) -> Self {
        let mut field_map = FxHashMap::default();
        for f in fields {
            field_map.insert(Arc::clone(&f.name), f);
        }
        let mut method_map: FxHashMap<Arc<str>, Vec<MethodInfo>> = FxHashMap::default();
        for m in methods {
            method_map.entry(Arc::clone(&m.name)).or_default().push(m);
        }
        Self {
            name: name.into(),
            qualified_name: qualified_name.into(),
            fields: field_map,
            methods: method_map,
            is_function_class,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FieldInfo {
    pub name: Arc<str>,
    /// Declared type as written in the source (simple or qualified, generics kept).
    pub declared_type: Arc<str>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MethodInfo {
    pub name: Arc<str>,
    pub return_type: Arc<str>,
    pub parameter_types: Vec<Arc<str>>,
}

impl MethodInfo {
    pub fn arity(&self) -> usize {
        self.parameter_types.len()
    }

    /// `(String, int) -> boolean` style summary shown next to method candidates.
    pub fn signature(&self) -> String {
        let params = self
            .parameter_types
            .iter()
            .map(|t| t.as_ref())
            .collect::<Vec<_>>()
            .join(", ");
        format!("({}) -> {}", params, self.return_type)
    }
}

/// Result of resolving a declared type name against the table. Unresolved names
/// are `Unknown`, never dropped: the resolver stops there with no candidates.
#[derive(Clone, Debug)]
pub enum TypeRef {
    Known(Arc<ClassInfo>),
    Unknown,
}

impl TypeRef {
    pub fn is_known(&self) -> bool {
        matches!(self, TypeRef::Known(_))
    }
}

pub const FUNCTION_NAMESPACE: &str = "#fn";

/// In-memory index of scanned classes plus the root-object bindings a rule
/// expression resolves against. Rebuilt wholesale per scan, never mutated
/// incrementally.
#[derive(Clone, Debug, PartialEq)]
pub struct SymbolTable {
    /// Simple name and qualified name both map to the class.
    classes: FxHashMap<Arc<str>, Arc<ClassInfo>>,
    /// Root object name -> declared class name (e.g. `baseInfo` -> `BaseInfo`).
    roots: FxHashMap<Arc<str>, Arc<str>>,
    default_root: Option<Arc<str>>,
    /// Synthetic aggregate of every function class, addressed as `#fn`.
    function_root: Option<Arc<ClassInfo>>,
    function_suffix: Arc<str>,
}

impl SymbolTable {
    pub fn new(function_suffix: &str) -> Self {
        Self {
            classes: FxHashMap::default(),
            roots: FxHashMap::default(),
            default_root: None,
            function_root: None,
            function_suffix: Arc::from(function_suffix),
        }
    }

    /// Index a class under both its simple and qualified name. The first class
    /// scanned under a simple name wins; the qualified entry stays distinct.
    pub fn add_class(&mut self, class: ClassInfo) {
        let class = Arc::new(class);
        self.classes
            .entry(Arc::clone(&class.name))
            .or_insert_with(|| Arc::clone(&class));
        if class.qualified_name != class.name {
            self.classes
                .entry(Arc::clone(&class.qualified_name))
                .or_insert_with(|| Arc::clone(&class));
        }
    }

    /// Rebuild the `#fn` namespace from the function classes currently indexed.
    /// Call after the last `add_class`.
    pub fn build_function_root(&mut self) {
        let mut methods: Vec<MethodInfo> = Vec::new();
        for class in self.classes() {
            if class.is_function_class {
                methods.extend(class.methods.values().flatten().cloned());
            }
        }
        self.function_root = if methods.is_empty() {
            None
        } else {
            Some(Arc::new(ClassInfo::new(
                FUNCTION_NAMESPACE,
                FUNCTION_NAMESPACE,
                vec![],
                methods,
                true,
            )))
        };
    }

    /// Unique indexed classes, ordered by qualified name.
    pub fn classes(&self) -> Vec<&Arc<ClassInfo>> {
        let mut seen: FxHashSet<&str> = FxHashSet::default();
        let mut unique: Vec<&Arc<ClassInfo>> = self
            .classes
            .values()
            .filter(|c| seen.insert(c.qualified_name.as_ref()))
            .collect();
        unique.sort_by(|a, b| a.qualified_name.cmp(&b.qualified_name));
        unique
    }

    pub fn class_count(&self) -> usize {
        self.classes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Resolve a declared type name to an indexed class. Generic arguments and
    /// array brackets are ignored; a qualified reference falls back to its
    /// simple name, matching how loosely the rule sources name their types.
    pub fn lookup_class(&self, declared: &str) -> Option<&Arc<ClassInfo>> {
        let base = base_type_name(declared);
        if let Some(class) = self.classes.get(base) {
            return Some(class);
        }
        base.rsplit('.')
            .next()
            .and_then(|simple| self.classes.get(simple))
    }

    pub fn lookup_type(&self, declared: &str) -> TypeRef {
        match self.lookup_class(declared) {
            Some(class) => TypeRef::Known(Arc::clone(class)),
            None => TypeRef::Unknown,
        }
    }

    /// Bind a well-known root object (the rule's base-context variable) to a
    /// class name. The first binding also becomes the default root.
    pub fn bind_root(&mut self, name: &str, class_name: &str) {
        self.roots.insert(Arc::from(name), Arc::from(class_name));
        if self.default_root.is_none() {
            self.default_root = Some(Arc::from(name));
        }
    }

    pub fn set_default_root(&mut self, name: &str) {
        self.default_root = Some(Arc::from(name));
    }

    pub fn default_root(&self) -> Option<&str> {
        self.default_root.as_deref()
    }

    pub fn roots(&self) -> impl Iterator<Item = (&Arc<str>, &Arc<str>)> {
        self.roots.iter()
    }

    pub fn root_type(&self, name: &str) -> TypeRef {
        match self.roots.get(name) {
            Some(class_name) => self.lookup_type(class_name),
            None => TypeRef::Unknown,
        }
    }

    pub fn default_root_type(&self) -> TypeRef {
        match &self.default_root {
            Some(name) => self.root_type(name),
            None => TypeRef::Unknown,
        }
    }

    pub fn function_root(&self) -> Option<&Arc<ClassInfo>> {
        self.function_root.as_ref()
    }

    pub fn function_suffix(&self) -> &str {
        &self.function_suffix
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new("Functions")
    }
}

/// Strip generic arguments and array brackets: `List<BaseInfo>` -> `List`,
/// `String[]` -> `String`.
fn base_type_name(declared: &str) -> &str {
    let no_generics = declared.split('<').next().unwrap_or(declared).trim();
    no_generics.trim_end_matches("[]").trim()
}
