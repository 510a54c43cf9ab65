//! Emits the Go source of one mock.
//!
//! For an interface `Store[T any]` with a method `Get(id string) (T, error)`
//! the emitter writes:
//!
//! ```go
//! type Store[T any] struct {
//! 	setupGet *mockSlot[func(string) (T, error)]
//! }
//!
//! func NewStore[T any](t *testing.T) *Store[T] { ... }
//! func (m *Store[T]) AssertExpectations(t *testing.T) bool { ... }
//! func (m *Store[T]) OnGet(funcs ...func(string) (T, error)) Config { ... }
//! func (m *Store[T]) Get(id string) (T, error) { ... }
//! ```

use std::collections::HashSet;

use fake_core::syntax::{FuncSignature, InterfaceSpec};

use crate::error::ResolveError;
use crate::imports::{FMT, TESTING};
use crate::printer::Printer;
use crate::resolve::MethodField;
use crate::scope::Scope;

/// Identifiers declared by the runtime file in the mock package.
const RUNTIME_NAMES: &[&str] = &[
    "Config",
    "RepeatForever",
    "mockSlot",
    "mockGroup",
    "newMockSlot",
];

/// Locals of the generated method bodies besides the `fmt` import.
const BODY_LOCALS: &[&str] = &["m", "fn", "ok"];

const ASSERT_EXPECTATIONS: &str = "AssertExpectations";

/// Name of the mock type for `interface`.
pub fn mock_name(interface: &str) -> String {
    if RUNTIME_NAMES.contains(&interface) {
        format!("{interface}Mock")
    } else {
        interface.to_string()
    }
}

/// Fails when a method of the interface shares its name with a member the
/// mock adds: `AssertExpectations`, an `On<M>` method or a `setup<M>` field.
fn check_members(interface: &str, shapes: &[MethodShape]) -> Result<(), ResolveError> {
    let methods: HashSet<&str> = shapes.iter().map(|s| s.name.as_str()).collect();
    let added = shapes
        .iter()
        .flat_map(|s| [format!("On{}", s.name), format!("setup{}", s.name)])
        .chain(std::iter::once(ASSERT_EXPECTATIONS.to_string()));
    for member in added {
        if methods.contains(member.as_str()) {
            return Err(ResolveError::MemberClash {
                interface: interface.to_string(),
                member,
            });
        }
    }
    Ok(())
}

/// A method with every type printed and every parameter named.
struct MethodShape {
    name: String,
    /// Parameter groups: names sharing one printed type.
    params: Vec<(Vec<String>, String)>,
    variadic: bool,
    /// One printed type per result value.
    results: Vec<String>,
}

impl MethodShape {
    fn param_names(&self) -> impl Iterator<Item = &String> {
        self.params.iter().flat_map(|(names, _)| names)
    }

    fn declared_params(&self) -> String {
        self.params
            .iter()
            .map(|(names, ty)| format!("{} {ty}", names.join(", ")))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn results_suffix(&self) -> String {
        match self.results.as_slice() {
            [] => String::new(),
            [single] => format!(" {single}"),
            many => format!(" ({})", many.join(", ")),
        }
    }

    /// `func(string, ...int) (T, error)`
    fn func_type(&self) -> String {
        let params: Vec<&str> = self
            .params
            .iter()
            .flat_map(|(names, ty)| names.iter().map(move |_| ty.as_str()))
            .collect();
        format!("func({}){}", params.join(", "), self.results_suffix())
    }

    fn call_args(&self) -> String {
        let mut args: Vec<String> = self.param_names().cloned().collect();
        if self.variadic {
            if let Some(last) = args.last_mut() {
                last.push_str("...");
            }
        }
        args.join(", ")
    }
}

/// Writes mocks into one generated file body.
pub struct MockEmitter<'p, 'a> {
    printer: &'p mut Printer<'a>,
}

impl<'p, 'a> MockEmitter<'p, 'a> {
    pub fn new(printer: &'p mut Printer<'a>) -> Self {
        Self { printer }
    }

    /// Append the mock for `spec`, declared in `scope`, to `out`.
    pub fn emit(
        &mut self,
        spec: &InterfaceSpec,
        scope: &Scope,
        out: &mut String,
    ) -> Result<(), ResolveError> {
        let methods = self.printer.resolver().resolve(scope)?;
        let shapes = methods
            .iter()
            .map(|method| self.shape(method))
            .collect::<Result<Vec<_>, _>>()?;
        check_members(&spec.name, &shapes)?;

        let name = mock_name(&spec.name);
        let mut declared = Vec::with_capacity(spec.type_params.len());
        for param in &spec.type_params {
            let constraint = self.printer.print_type(&param.constraint, scope)?;
            declared.push(format!("{} {constraint}", param.name));
        }
        let (decl_params, type_args) = if declared.is_empty() {
            (String::new(), String::new())
        } else {
            let names: Vec<&str> = spec.type_params.iter().map(|p| p.name.as_str()).collect();
            (
                format!("[{}]", declared.join(", ")),
                format!("[{}]", names.join(", ")),
            )
        };
        let testing = self.printer.imports().use_import(TESTING, TESTING, TESTING);

        out.push_str(&format!("type {name}{decl_params} struct {{\n"));
        for shape in &shapes {
            out.push_str(&format!(
                "\tsetup{} *mockSlot[{}]\n",
                shape.name,
                shape.func_type()
            ));
        }
        out.push_str("}\n\n");

        out.push_str(&format!(
            "func New{name}{decl_params}(t *{testing}.T) *{name}{type_args} {{\n"
        ));
        if shapes.is_empty() {
            out.push_str(&format!("\treturn &{name}{type_args}{{}}\n"));
        } else {
            out.push_str(&format!("\treturn &{name}{type_args}{{\n"));
            for shape in &shapes {
                out.push_str(&format!(
                    "\t\tsetup{method}: newMockSlot[{func}](t, \"{name}.{method}\"),\n",
                    method = shape.name,
                    func = shape.func_type(),
                ));
            }
            out.push_str("\t}\n");
        }
        out.push_str("}\n\n");

        let receiver = format!("m *{name}{type_args}");
        out.push_str(&format!(
            "func ({receiver}) AssertExpectations(t *{testing}.T) bool {{\n"
        ));
        let checks: Vec<String> = shapes
            .iter()
            .map(|shape| format!("m.setup{}.AssertExpectations(t)", shape.name))
            .collect();
        if checks.is_empty() {
            out.push_str("\treturn true\n");
        } else {
            out.push_str(&format!("\treturn {}\n", checks.join(" &&\n\t\t")));
        }
        out.push_str("}\n\n");

        for shape in &shapes {
            self.emit_method(&receiver, shape, out);
        }
        Ok(())
    }

    fn emit_method(&mut self, receiver: &str, shape: &MethodShape, out: &mut String) {
        let method = &shape.name;
        out.push_str(&format!(
            "func ({receiver}) On{method}(funcs ...{}) Config {{\n",
            shape.func_type()
        ));
        out.push_str(&format!("\treturn m.setup{method}.append(funcs...)\n"));
        out.push_str("}\n\n");

        out.push_str(&format!(
            "func ({receiver}) {method}({}){} {{\n",
            shape.declared_params(),
            shape.results_suffix()
        ));
        out.push_str(&format!("\tfn, ok := m.setup{method}.call()\n"));
        out.push_str("\tif !ok {\n");
        let names: Vec<&str> = shape.param_names().map(String::as_str).collect();
        if names.is_empty() {
            out.push_str(&format!("\t\tpanic(\"unexpected call {method}()\")\n"));
        } else {
            let fmt = self.printer.imports().use_import(FMT, FMT, FMT);
            let verbs = vec!["%v"; names.len()].join(", ");
            out.push_str(&format!(
                "\t\tpanic({fmt}.Sprintf(\"unexpected call {method}({verbs})\", {}))\n",
                names.join(", ")
            ));
        }
        out.push_str("\t}\n");
        let call = format!("(*fn)({})", shape.call_args());
        if shape.results.is_empty() {
            out.push_str(&format!("\t{call}\n"));
        } else {
            out.push_str(&format!("\treturn {call}\n"));
        }
        out.push_str("}\n\n");
    }

    fn shape(&mut self, method: &MethodField) -> Result<MethodShape, ResolveError> {
        let signature: &FuncSignature = &method.signature;
        let fmt = self.printer.imports().claim(FMT, FMT, FMT);
        let names = param_names(signature, &fmt);

        let mut params = Vec::with_capacity(signature.params.len());
        for (group, names) in signature.params.iter().zip(names) {
            params.push((names, self.printer.print_type(&group.ty, &method.scope)?));
        }
        let mut results = Vec::new();
        for group in &signature.results {
            let ty = self.printer.print_type(&group.ty, &method.scope)?;
            results.extend(std::iter::repeat(ty).take(group.arity()));
        }
        Ok(MethodShape {
            name: method.name.clone(),
            params,
            variadic: signature.params.last().is_some_and(|g| g.is_variadic()),
            results,
        })
    }
}

/// Names for every parameter, one list per group.
///
/// Unnamed parameters become `a<i>` (`i` is the group index); `_` becomes
/// `a<i>`, or `a<i>_<j>` inside a group of several names. A name that would
/// shadow a local of the generated body, or a synthetic name that repeats a
/// declared one, gets trailing `_` until it is free.
fn param_names(signature: &FuncSignature, fmt: &str) -> Vec<Vec<String>> {
    let mut taken: HashSet<String> = BODY_LOCALS.iter().map(|s| s.to_string()).collect();
    taken.insert(fmt.to_string());
    let declared: HashSet<&str> = signature
        .params
        .iter()
        .flat_map(|g| g.names.iter().map(String::as_str))
        .filter(|n| *n != "_")
        .collect();

    let mut out = Vec::with_capacity(signature.params.len());
    for (i, group) in signature.params.iter().enumerate() {
        let raw: Vec<(String, bool)> = match group.names.as_slice() {
            [] => vec![(format!("a{i}"), true)],
            [name] if name == "_" => vec![(format!("a{i}"), true)],
            names => names
                .iter()
                .enumerate()
                .map(|(j, n)| match n.as_str() {
                    "_" => (format!("a{i}_{j}"), true),
                    _ => (n.clone(), false),
                })
                .collect(),
        };
        let names = raw
            .into_iter()
            .map(|(mut name, synthetic)| {
                while taken.contains(&name) || (synthetic && declared.contains(name.as_str())) {
                    name.push('_');
                }
                taken.insert(name.clone());
                name
            })
            .collect();
        out.push(names);
    }
    out
}
