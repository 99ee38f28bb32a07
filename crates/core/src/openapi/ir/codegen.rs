//! Code generation from API IR to TypeScript AST.
//!
//! Produces the four modules of a generated client: `client.ts`, `types.ts`,
//! `index.ts` and the optional `client.test.ts`.

use super::api::{ApiIR, HttpMethod, OperationIR, ParamIR};
use super::types::{
    BinOp, TemplatePart, TsClass, TsExpr, TsField, TsImport, TsLiteral, TsMethod, TsModule,
    TsParam, TsPrimitive, TsProp, TsReExport, TsStmt, TsTest, TsType, VarKind,
};
use super::utils::{escape_template_static, format_param_access};

const CLIENT_CLASS: &str = "ApiClient";
const TYPES_MODULE: &str = "./types.js";
const CLIENT_MODULE: &str = "./client.js";

/// At most this many per-operation smoke tests are generated.
const MAX_OPERATION_TESTS: usize = 10;
/// Page size used by generated test calls.
const TEST_PAGE_SIZE: i64 = 5;

const LIMIT_LIKE: &[&str] = &["limit", "per_page", "perPage", "page_size", "pageSize", "size", "take"];
const SKIP_LIKE: &[&str] = &["skip", "offset", "start"];

/// The generated modules before emission.
#[derive(Debug, Clone)]
pub struct ClientModules {
    pub client: TsModule,
    pub types: TsModule,
    pub index: TsModule,
    pub tests: Option<TsModule>,
}

/// Generate every module for an API.
pub fn codegen_modules(api: &ApiIR, generate_tests: bool) -> ClientModules {
    ClientModules {
        client: codegen_client(api),
        types: codegen_types(api),
        index: codegen_index(),
        tests: generate_tests.then(|| codegen_tests(api)),
    }
}

// =============================================================================
// types.ts
// =============================================================================

fn codegen_types(api: &ApiIR) -> TsModule {
    if api.types.is_empty() {
        return TsModule {
            comments: vec!["No schemas defined in OpenAPI spec".to_string()],
            ..TsModule::default()
        };
    }
    TsModule {
        types: api.types.clone(),
        ..TsModule::default()
    }
}

// =============================================================================
// index.ts
// =============================================================================

fn codegen_index() -> TsModule {
    TsModule {
        re_exports: vec![
            TsReExport::Named {
                items: vec![CLIENT_CLASS.to_string()],
                from: CLIENT_MODULE.to_string(),
            },
            TsReExport::All {
                from: TYPES_MODULE.to_string(),
            },
        ],
        ..TsModule::default()
    }
}

// =============================================================================
// client.ts
// =============================================================================

fn codegen_client(api: &ApiIR) -> TsModule {
    let mut refs = Vec::new();
    for op in &api.operations {
        for p in op.path_params.iter().chain(&op.query_params) {
            p.ty.collect_refs(&mut refs);
        }
        if let Some(body) = &op.body {
            body.ty.collect_refs(&mut refs);
        }
        op.response.ty.collect_refs(&mut refs);
    }
    refs.retain(|name| api.types.iter().any(|t| &t.name == name));
    refs.sort();

    let imports = if refs.is_empty() {
        Vec::new()
    } else {
        vec![TsImport {
            items: refs,
            from: TYPES_MODULE.to_string(),
            type_only: true,
        }]
    };

    TsModule {
        imports,
        classes: vec![build_client_class(api)],
        ..TsModule::default()
    }
}

fn this_base_url() -> TsExpr {
    TsExpr::member(TsExpr::ident("this"), "baseUrl")
}

fn assign(target: TsExpr, value: TsExpr) -> TsStmt {
    TsStmt::Expr(TsExpr::BinOp {
        left: Box::new(target),
        op: BinOp::Assign,
        right: Box::new(value),
    })
}

fn build_client_class(api: &ApiIR) -> TsClass {
    let string = TsType::Primitive(TsPrimitive::String);

    let constructor = TsMethod {
        name: "constructor".to_string(),
        params: vec![TsParam {
            default: Some(TsExpr::string(&api.base_url)),
            ..TsParam::required("baseUrl", string.clone())
        }],
        return_type: None,
        body: vec![assign(
            this_base_url(),
            TsExpr::method_call(
                TsExpr::ident("baseUrl"),
                "replace",
                vec![TsExpr::Raw(r"/\/$/".to_string()), TsExpr::string("")],
            ),
        )],
        is_async: false,
        doc: None,
    };

    TsClass {
        name: CLIENT_CLASS.to_string(),
        is_export: true,
        fields: vec![TsField {
            name: "baseUrl".to_string(),
            ty: string,
            is_private: true,
        }],
        constructor: Some(constructor),
        methods: api.operations.iter().map(build_method).collect(),
    }
}

/// `{ limit?: number; skip?: number }`
fn query_object_type(params: &[ParamIR]) -> TsType {
    TsType::Object(
        params
            .iter()
            .map(|p| TsProp {
                name: p.name.clone(),
                ty: p.ty.clone(),
                optional: true,
            })
            .collect(),
    )
}

fn build_method(op: &OperationIR) -> TsMethod {
    let mut params: Vec<TsParam> = op
        .path_params
        .iter()
        .map(|p| TsParam::required(&p.name, p.ty.clone()))
        .collect();
    if let Some(body) = &op.body {
        params.push(TsParam::required("body", body.ty.clone()));
    }
    if !op.query_params.is_empty() {
        params.push(TsParam::optional("query", query_object_type(&op.query_params)));
    }

    TsMethod {
        name: op.name.clone(),
        params,
        return_type: Some(TsType::promise(op.response.ty.clone())),
        body: build_method_body(op),
        is_async: true,
        doc: op.summary.clone(),
    }
}

fn build_method_body(op: &OperationIR) -> Vec<TsStmt> {
    let mut body = Vec::new();
    let url = || TsExpr::ident("url");

    let mutable = !op.path_params.is_empty() || !op.query_params.is_empty();
    body.push(TsStmt::VarDecl {
        kind: if mutable { VarKind::Let } else { VarKind::Const },
        name: "url".to_string(),
        ty: None,
        init: TsExpr::Template(vec![
            TemplatePart::Dynamic(this_base_url()),
            TemplatePart::Static(escape_template_static(&op.path)),
        ]),
    });

    // Placeholders are replaced literally
    for p in &op.path_params {
        let encoded = TsExpr::call(
            TsExpr::ident("encodeURIComponent"),
            vec![TsExpr::call(TsExpr::ident("String"), vec![TsExpr::ident(&p.name)])],
        );
        let replaced = TsExpr::method_call(
            TsExpr::method_call(url(), "split", vec![TsExpr::string(format!("{{{}}}", p.original_name))]),
            "join",
            vec![encoded],
        );
        body.push(assign(url(), replaced));
    }

    if !op.query_params.is_empty() {
        body.push(TsStmt::VarDecl {
            kind: VarKind::Const,
            name: "searchParams".to_string(),
            ty: None,
            init: TsExpr::New {
                callee: Box::new(TsExpr::ident("URLSearchParams")),
                args: vec![],
            },
        });
        for p in &op.query_params {
            let set = TsExpr::method_call(
                TsExpr::ident("searchParams"),
                "set",
                vec![
                    TsExpr::string(&p.name),
                    TsExpr::call(
                        TsExpr::ident("String"),
                        vec![TsExpr::Raw(format_param_access("query", &p.name, true))],
                    ),
                ],
            );
            body.push(TsStmt::IfInline {
                cond: TsExpr::BinOp {
                    left: Box::new(TsExpr::Raw(format_param_access("query", &p.name, false))),
                    op: BinOp::NotEqual,
                    right: Box::new(TsExpr::Literal(TsLiteral::Null)),
                },
                then: Box::new(TsStmt::Expr(set)),
            });
        }
        body.push(TsStmt::VarDecl {
            kind: VarKind::Const,
            name: "queryString".to_string(),
            ty: None,
            init: TsExpr::method_call(TsExpr::ident("searchParams"), "toString", vec![]),
        });
        body.push(TsStmt::IfInline {
            cond: TsExpr::ident("queryString"),
            then: Box::new(TsStmt::Expr(TsExpr::BinOp {
                left: Box::new(url()),
                op: BinOp::AddAssign,
                right: Box::new(TsExpr::Template(vec![
                    TemplatePart::Static("?".to_string()),
                    TemplatePart::Dynamic(TsExpr::ident("queryString")),
                ])),
            })),
        });
    }

    let mut init = vec![("method".to_string(), TsExpr::string(op.method.as_str()))];
    if op.body.is_some() {
        init.push((
            "headers".to_string(),
            TsExpr::Object(vec![(
                "Content-Type".to_string(),
                TsExpr::string("application/json"),
            )]),
        ));
        init.push((
            "body".to_string(),
            TsExpr::method_call(TsExpr::ident("JSON"), "stringify", vec![TsExpr::ident("body")]),
        ));
    }
    body.push(TsStmt::VarDecl {
        kind: VarKind::Const,
        name: "response".to_string(),
        ty: None,
        init: TsExpr::await_(TsExpr::call(
            TsExpr::ident("fetch"),
            vec![url(), TsExpr::Object(init)],
        )),
    });

    let response = || TsExpr::ident("response");
    body.push(TsStmt::If {
        cond: TsExpr::Not(Box::new(TsExpr::member(response(), "ok"))),
        then_body: vec![TsStmt::Throw(TsExpr::New {
            callee: Box::new(TsExpr::ident("Error")),
            args: vec![TsExpr::Template(vec![
                TemplatePart::Static("API error: ".to_string()),
                TemplatePart::Dynamic(TsExpr::member(response(), "status")),
                TemplatePart::Static(" ".to_string()),
                TemplatePart::Dynamic(TsExpr::member(response(), "statusText")),
            ])],
        })],
        else_body: None,
    });

    body.push(TsStmt::Return(Some(TsExpr::await_(TsExpr::method_call(
        response(),
        "json",
        vec![],
    )))));

    body
}

// =============================================================================
// client.test.ts
// =============================================================================

fn client_call(op: &OperationIR, query: Vec<(String, TsExpr)>) -> TsExpr {
    let args = if query.is_empty() {
        vec![]
    } else {
        vec![TsExpr::Object(query)]
    };
    TsExpr::await_(TsExpr::method_call(TsExpr::ident("client"), &op.name, args))
}

fn page_size() -> TsExpr {
    TsExpr::Literal(TsLiteral::Int(TEST_PAGE_SIZE))
}

fn expect(actual: TsExpr, matcher: &str, expected: Vec<TsExpr>) -> TsStmt {
    TsStmt::Expr(TsExpr::method_call(
        TsExpr::call(TsExpr::ident("expect"), vec![actual]),
        matcher,
        expected,
    ))
}

fn const_decl(name: &str, init: TsExpr) -> TsStmt {
    TsStmt::VarDecl {
        kind: VarKind::Const,
        name: name.to_string(),
        ty: None,
        init,
    }
}

fn codegen_tests(api: &ApiIR) -> TsModule {
    let mut tests = vec![TsTest {
        name: "client instantiates correctly".to_string(),
        is_async: false,
        body: vec![expect(
            TsExpr::ident("client"),
            "toBeInstanceOf",
            vec![TsExpr::ident(CLIENT_CLASS)],
        )],
    }];

    let simple_gets: Vec<&OperationIR> = api
        .operations
        .iter()
        .filter(|op| op.method == HttpMethod::Get && op.path_params.is_empty())
        .collect();

    for op in simple_gets.iter().take(MAX_OPERATION_TESTS) {
        tests.push(operation_test(op));
    }

    let paginated: Vec<&OperationIR> = simple_gets
        .iter()
        .copied()
        .filter(|op| op.numeric_query_param(LIMIT_LIKE).is_some() && op.numeric_query_param(SKIP_LIKE).is_some())
        .collect();
    if paginated.len() >= 2
        && let Some(test) = pagination_test(paginated[0])
    {
        tests.push(test);
    }

    TsModule {
        imports: vec![
            TsImport {
                items: vec!["test".to_string(), "expect".to_string()],
                from: "bun:test".to_string(),
                type_only: false,
            },
            TsImport {
                items: vec![CLIENT_CLASS.to_string()],
                from: CLIENT_MODULE.to_string(),
                type_only: false,
            },
        ],
        statements: vec![const_decl(
            "client",
            TsExpr::New {
                callee: Box::new(TsExpr::ident(CLIENT_CLASS)),
                args: vec![],
            },
        )],
        tests,
        ..TsModule::default()
    }
}

fn operation_test(op: &OperationIR) -> TsTest {
    let limit = op.numeric_query_param(&["limit"]);
    let query = limit
        .map(|p| vec![(p.name.clone(), page_size())])
        .unwrap_or_default();

    let result = || TsExpr::ident("result");
    let mut body = vec![const_decl("result", client_call(op, query))];

    let kind = if op.response.is_array {
        body.push(expect(
            TsExpr::method_call(TsExpr::ident("Array"), "isArray", vec![result()]),
            "toBe",
            vec![TsExpr::Literal(TsLiteral::Bool(true))],
        ));
        if limit.is_some() {
            body.push(expect(
                TsExpr::member(result(), "length"),
                "toBeLessThanOrEqual",
                vec![page_size()],
            ));
        }
        "array"
    } else {
        body.push(expect(result(), "not.toBeNull", vec![]));
        body.push(expect(
            TsExpr::Raw("typeof result".to_string()),
            "toBe",
            vec![TsExpr::string("object")],
        ));
        "object"
    };

    TsTest {
        name: format!("{} returns {kind}", op.name),
        is_async: true,
        body,
    }
}

fn pagination_test(op: &OperationIR) -> Option<TsTest> {
    let limit = op.numeric_query_param(LIMIT_LIKE)?;
    let skip = op.numeric_query_param(SKIP_LIKE)?;

    let page = |offset: i64| {
        vec![
            (limit.name.clone(), page_size()),
            (skip.name.clone(), TsExpr::Literal(TsLiteral::Int(offset))),
        ]
    };

    Some(TsTest {
        name: format!("{} paginates with {}/{}", op.name, limit.name, skip.name),
        is_async: true,
        body: vec![
            const_decl("first", client_call(op, page(0))),
            const_decl("second", client_call(op, page(TEST_PAGE_SIZE))),
            expect(
                TsExpr::ident("first"),
                "not.toEqual",
                vec![TsExpr::ident("second")],
            ),
        ],
    })
}
