use super::*;
use crate::scope::TypeParamRef;
use crate::test_support::{declared, GoModuleFixture};

fn names(methods: &[MethodField]) -> Vec<&str> {
    methods.iter().map(|m| m.name.as_str()).collect()
}

#[test]
fn test_own_methods_then_embeds_in_order() {
    let fixture = GoModuleFixture::new();
    let path = fixture.write(
        "svc/svc.go",
        r#"package svc

type A interface {
	C
	B
	Own()
}

type B interface {
	FromB()
}

type C interface {
	FromC1()
	FromC2()
}
"#,
    );
    let mut resolver = fixture.resolver();
    let scope = declared(&mut resolver, &path, "A");
    let methods = resolver.resolve(&scope).unwrap();
    assert_eq!(names(&methods), vec!["Own", "FromC1", "FromC2", "FromB"]);
}

#[test]
fn test_diamond_keeps_first_occurrence() {
    let fixture = GoModuleFixture::new();
    let path = fixture.write(
        "svc/svc.go",
        r#"package svc

type D interface {
	M() int
}

type B interface {
	D
	OnlyB()
}

type C interface {
	OnlyC()
	D
}

type A interface {
	B
	C
}
"#,
    );
    let mut resolver = fixture.resolver();
    let scope = declared(&mut resolver, &path, "A");
    let methods = resolver.resolve(&scope).unwrap();
    assert_eq!(names(&methods), vec!["OnlyB", "M", "OnlyC"]);
}

#[test]
fn test_generic_embedding_binds_outer_parameter() {
    let fixture = GoModuleFixture::new();
    let path = fixture.write(
        "svc/svc.go",
        r#"package svc

type A[T any] interface {
	B[T]
}

type B[J any] interface {
	Method() J
}
"#,
    );
    let mut resolver = fixture.resolver();
    let scope = declared(&mut resolver, &path, "A");
    let methods = resolver.resolve(&scope).unwrap();
    assert_eq!(names(&methods), vec!["Method"]);
    match methods[0].scope.type_param("J") {
        Some(TypeParamRef::Bound(binding)) => {
            assert_eq!(binding.expr, TypeExpr::ident("T"));
            assert_eq!(binding.scope.key(), scope.key());
        }
        _ => panic!("J should be bound to the embedding argument"),
    }
}

#[test]
fn test_same_interface_embedded_under_two_instantiations() {
    let fixture = GoModuleFixture::new();
    let path = fixture.write(
        "svc/svc.go",
        r#"package svc

type Getter[J any] interface {
	Get() J
}

type Ints interface {
	Getter[int]
}

type Strings interface {
	Getter[string]
}
"#,
    );
    let mut resolver = fixture.resolver();
    let ints = declared(&mut resolver, &path, "Ints");
    let strings = declared(&mut resolver, &path, "Strings");
    let ints = resolver.resolve(&ints).unwrap();
    let strings = resolver.resolve(&strings).unwrap();
    assert_ne!(ints[0].scope.key(), strings[0].scope.key());
}

#[test]
fn test_embedding_from_sibling_file() {
    let fixture = GoModuleFixture::new();
    fixture.write(
        "svc/base.go",
        "package svc\n\ntype Closer interface {\n\tClose() error\n}\n",
    );
    let path = fixture.write(
        "svc/svc.go",
        "package svc\n\ntype Service interface {\n\tCloser\n\tRun()\n}\n",
    );
    let mut resolver = fixture.resolver();
    let scope = declared(&mut resolver, &path, "Service");
    let methods = resolver.resolve(&scope).unwrap();
    assert_eq!(names(&methods), vec!["Run", "Close"]);
    assert!(methods[1].scope.file().path.ends_with("svc/base.go"));
}

#[test]
fn test_embedding_from_other_package() {
    let fixture = GoModuleFixture::new();
    fixture.write("io/doc.go", "package io\n");
    fixture.write(
        "io/reader.go",
        "package io\n\ntype Reader interface {\n\tRead(p []byte) (int, error)\n}\n",
    );
    let path = fixture.write(
        "svc/svc.go",
        "package svc\n\nimport myio \"example.com/app/io\"\n\ntype Source interface {\n\tmyio.Reader\n}\n",
    );
    let mut resolver = fixture.resolver();
    let scope = declared(&mut resolver, &path, "Source");
    let methods = resolver.resolve(&scope).unwrap();
    assert_eq!(names(&methods), vec!["Read"]);
    assert_eq!(methods[0].scope.file().package.path, "example.com/app/io");
}

#[test]
fn test_builtin_embeds() {
    let fixture = GoModuleFixture::new();
    let path = fixture.write(
        "svc/svc.go",
        r#"package svc

type Failure interface {
	error
	any
	Code() int
}

type Number interface {
	~int | ~float64
}
"#,
    );
    let mut resolver = fixture.resolver();
    let scope = declared(&mut resolver, &path, "Failure");
    assert_eq!(names(&resolver.resolve(&scope).unwrap()), vec!["Code", "Error"]);
    let scope = declared(&mut resolver, &path, "Number");
    assert!(resolver.resolve(&scope).unwrap().is_empty());
}

#[test]
fn test_results_are_memoized() {
    let fixture = GoModuleFixture::new();
    let path = fixture.write("svc/svc.go", "package svc\n\ntype A interface{ M() }\n");
    let mut resolver = fixture.resolver();
    let scope = declared(&mut resolver, &path, "A");
    let first = resolver.resolve(&scope).unwrap();
    let second = resolver.resolve(&scope).unwrap();
    assert!(Arc::ptr_eq(&first, &second));
}

#[test]
fn test_single_argument_must_be_identifier() {
    let fixture = GoModuleFixture::new();
    let path = fixture.write(
        "svc/svc.go",
        r#"package svc

type B[J any] interface {
	Get() J
}

type A interface {
	B[[]int]
}
"#,
    );
    let mut resolver = fixture.resolver();
    let scope = declared(&mut resolver, &path, "A");
    let err = resolver.resolve(&scope).unwrap_err();
    assert!(matches!(err, ResolveError::UnsupportedInstantiation { .. }));
}

#[test]
fn test_argument_count_must_match() {
    let fixture = GoModuleFixture::new();
    let path = fixture.write(
        "svc/svc.go",
        r#"package svc

type Pair[K comparable, V any] interface {
	Get(K) V
}

type A interface {
	Pair[string]
}
"#,
    );
    let mut resolver = fixture.resolver();
    let scope = declared(&mut resolver, &path, "A");
    let err = resolver.resolve(&scope).unwrap_err();
    assert!(matches!(
        err,
        ResolveError::ArityMismatch {
            expected: 2,
            found: 1,
            ..
        }
    ));
}

#[test]
fn test_embedding_cycle_is_reported() {
    let fixture = GoModuleFixture::new();
    let path = fixture.write(
        "svc/svc.go",
        "package svc\n\ntype A interface {\n\tB\n}\n\ntype B interface {\n\tA\n}\n",
    );
    let mut resolver = fixture.resolver();
    let scope = declared(&mut resolver, &path, "A");
    let err = resolver.resolve(&scope).unwrap_err();
    assert!(matches!(err, ResolveError::EmbeddingCycle(name) if name == "A"));
}

#[test]
fn test_unknown_qualifier_and_missing_interface() {
    let fixture = GoModuleFixture::new();
    let path = fixture.write(
        "svc/svc.go",
        "package svc\n\ntype A interface {\n\tnope.Reader\n}\n\ntype B interface {\n\tMissing\n}\n",
    );
    let mut resolver = fixture.resolver();
    let scope = declared(&mut resolver, &path, "A");
    assert!(matches!(
        resolver.resolve(&scope).unwrap_err(),
        ResolveError::UnknownPackage { package, .. } if package == "nope"
    ));
    let scope = declared(&mut resolver, &path, "B");
    assert!(matches!(
        resolver.resolve(&scope).unwrap_err(),
        ResolveError::InterfaceNotFound { name, .. } if name == "Missing"
    ));
}
