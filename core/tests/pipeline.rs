use apigraph_core::document::ParamLocation;
use apigraph_core::{
    mock_reply, to_openapi, GenerationRun, GeneratorConfig, HttpVerb, Schema, SourceManifest,
};
use pretty_assertions::assert_eq;

const PETSTORE: &str = r#"
project: petstore
types:
  com.acme.Pet:
    doc: "A pet"
    fields:
      - {name: id, type: long}
      - {name: name, type: String, annotations: [{name: NotNull}]}
      - {name: born, type: java.time.LocalDate}
      - {name: parent, type: com.acme.Pet}
      - {name: status, type: com.acme.Status}
  com.acme.Status:
    kind: enum
    constants:
      - {name: AVAILABLE}
      - {name: SOLD}
  com.acme.Page:
    type_params: [T]
    fields:
      - {name: items, type: "java.util.List<T>"}
      - {name: total, type: long}
  com.acme.Receipt:
    fields:
      - {name: amount, type: double}
classes:
  - name: PetController
    doc: "Pet operations"
    annotations:
      - {name: RestController}
      - {name: RequestMapping, value: "/pets"}
    methods:
      - name: list
        doc: "/** List pets.\n * @return one page of pets */"
        return_type: "com.acme.Page<com.acme.Pet>"
        annotations: [{name: GetMapping}]
        parameters:
          - name: limit
            type: int
            annotations: [{name: RequestParam, attributes: {required: false, defaultValue: "10"}}]
      - name: find
        return_type: com.acme.Pet
        annotations: [{name: GetMapping, value: "/{id}"}]
        parameters:
          - name: id
            type: long
            annotations: [{name: PathVariable}]
      - name: create
        return_type: com.acme.Pet
        annotations: [{name: PostMapping}]
        parameters:
          - name: pet
            type: com.acme.Pet
            annotations: [{name: RequestBody}]
  - name: OwnerResource
    annotations:
      - {name: Path, value: "/owners"}
    methods:
      - name: pets
        annotations: [{name: GET}, {name: Path, value: "/{owner}/pets"}]
        return_type: "java.util.List<com.acme.Pet>"
        parameters:
          - name: owner
            type: String
            annotations: [{name: PathParam, value: "owner"}]
  - name: CheckoutServiceImpl
    annotations:
      - {name: Service, qualified_name: com.alibaba.dubbo.config.annotation.Service}
    methods:
      - name: pay
        return_type: com.acme.Receipt
        parameters:
          - {name: petId, type: long}
"#;

fn generate() -> apigraph_core::ApiDocument {
    let mut run = GenerationRun::new(GeneratorConfig::default());
    run.add_manifest(SourceManifest::from_yaml(PETSTORE).unwrap())
        .unwrap();
    let mut docs = run.run().unwrap();
    docs.remove("petstore").unwrap()
}

#[test]
fn test_all_dialects_contribute_paths() {
    let doc = generate();
    let paths: Vec<&str> = doc.paths.keys().map(String::as_str).collect();
    assert_eq!(
        paths,
        vec![
            "/CheckoutServiceImpl/pay",
            "/owners/{owner}/pets",
            "/pets",
            "/pets/{id}",
        ]
    );
    assert!(doc.operation("/pets", HttpVerb::Get).is_some());
    assert!(doc.operation("/pets", HttpVerb::Post).is_some());

    let tags: Vec<&str> = doc.tags.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(
        tags,
        vec!["CheckoutServiceImpl", "OwnerResource", "PetController"]
    );
}

#[test]
fn test_generic_and_self_referencing_definitions() {
    let doc = generate();
    assert!(doc.definitions.contains_key("Pet"));
    assert!(doc.definitions.contains_key("Page«Pet»"));
    assert!(doc.definitions.contains_key("Receipt"));

    let list = doc.operation("/pets", HttpVerb::Get).unwrap();
    assert_eq!(
        list.responses["200"].schema,
        Some(Schema::reference("Page«Pet»"))
    );
    assert_eq!(list.responses["200"].description, "one page of pets");
    let limit = &list.parameters[0];
    assert_eq!(limit.location, ParamLocation::Query);
    assert!(!limit.required);

    let create = doc.operation("/pets", HttpVerb::Post).unwrap();
    assert_eq!(create.parameters[0].location, ParamLocation::Body);
}

#[test]
fn test_openapi_conversion() {
    let doc = generate();
    let openapi = to_openapi(&doc).unwrap();
    assert_eq!(openapi["openapi"], "3.0.0");
    assert!(openapi.get("definitions").is_none());
    assert!(openapi["components"]["schemas"].get("PagePet").is_some());
    assert_eq!(
        openapi["paths"]["/pets"]["get"]["responses"]["200"]["content"]["application/json"]
            ["schema"]["$ref"],
        "#/components/schemas/PagePet"
    );
    let create = &openapi["paths"]["/pets"]["post"];
    assert!(create.get("parameters").is_none());
    assert_eq!(
        create["requestBody"]["content"]["application/json"]["schema"]["$ref"],
        "#/components/schemas/Pet"
    );
    assert!(openapi["components"]["securitySchemes"].get("api_key").is_some());
}

#[test]
fn test_mock_from_generated_document() {
    let doc = generate();
    let reply = mock_reply(&doc, "GET", "/pets/42", 5).unwrap();
    assert_eq!(reply.template, "/pets/{id}");
    let body = reply.body.unwrap();
    assert!(body["name"].is_string());
    assert_eq!(body["born"], "2018-09-10");
    let status = body["status"].as_str().unwrap();
    assert!(status == "AVAILABLE" || status == "SOLD");

    let page = mock_reply(&doc, "get", "/pets", 5).unwrap().body.unwrap();
    assert_eq!(page["items"].as_array().unwrap().len(), 3);

    assert!(mock_reply(&doc, "DELETE", "/pets/42", 5).is_err());
}
