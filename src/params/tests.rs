//! Tests for params module
//!
//! These tests verify the validator end to end:
//! - first violation wins, in declaration order
//! - normalization and write-back into query and body
//! - file attachment checks
//! - the route layer over JSON, form, multipart and query inputs

#[cfg(test)]
mod tests {
    use super::super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        middleware::from_fn_with_state,
        routing::post,
        Json, Router,
    };
    use bytes::Bytes;
    use once_cell::sync::Lazy;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn record(query: Value, body: Value) -> InputRecord {
        let as_fields = |v: Value| match v {
            Value::Object(map) => map,
            _ => Fields::new(),
        };
        InputRecord::new(as_fields(query), as_fields(body))
    }

    fn rejection(rules: &RuleSet, input: &InputRecord) -> String {
        match validate(rules, input) {
            ValidationOutcome::Rejected(err) => err.to_string(),
            ValidationOutcome::Accepted(out) => panic!("expected rejection, got {:?}", out),
        }
    }

    fn accepted(rules: &RuleSet, input: &InputRecord) -> InputRecord {
        validate(rules, input)
            .into_result()
            .unwrap_or_else(|e| panic!("expected acceptance, got {}", e))
    }

    fn png(field: &str, name: &str, size: usize) -> FileAttachment {
        FileAttachment::new(field, "image/png", name, Bytes::from(vec![0u8; size]))
    }

    #[test]
    fn test_invalid_number_message() {
        let rules = RuleSet::new().field("price", Rule::new().numeric().required());
        let input = record(json!({}), json!({"price": "abc"}));
        assert_eq!(rejection(&rules, &input), "price should be a valid number.");
    }

    #[test]
    fn test_missing_required_message() {
        let rules = RuleSet::new().field("bookingDate", Rule::new().required());
        assert_eq!(
            rejection(&rules, &InputRecord::default()),
            "bookingDate is required"
        );

        let blank = record(json!({}), json!({"bookingDate": ""}));
        assert_eq!(rejection(&rules, &blank), "bookingDate is required");
    }

    #[test]
    fn test_first_declared_violation_wins() {
        let input = record(json!({}), json!({"count": "many"}));

        let name_first = RuleSet::new()
            .field("name", Rule::new().required())
            .field("count", Rule::new().numeric());
        assert_eq!(rejection(&name_first, &input), "name is required");

        let count_first = RuleSet::new()
            .field("count", Rule::new().numeric())
            .field("name", Rule::new().required());
        assert_eq!(rejection(&count_first, &input), "count should be a valid number.");
    }

    #[test]
    fn test_required_runs_before_format_checks() {
        let rules = RuleSet::new().field("slot", Rule::new().required().time());
        assert_eq!(
            rejection(&rules, &InputRecord::default()),
            "slot is required"
        );
        let input = record(json!({}), json!({"slot": "25:00:00"}));
        assert_eq!(
            rejection(&rules, &input),
            "slot must be a valid 24-hour time in the format HH:MM:SS"
        );
    }

    #[test]
    fn test_enum_ignores_case_and_keeps_casing() {
        let rules =
            RuleSet::new().field("category", Rule::new().one_of(["cleaning", "repair"]));

        let out = accepted(&rules, &record(json!({}), json!({"category": "REPAIR"})));
        assert_eq!(out.body["category"], "REPAIR");

        let out = accepted(&rules, &record(json!({}), json!({"category": "Cleaning "})));
        assert_eq!(out.body["category"], "Cleaning ");

        assert_eq!(
            rejection(&rules, &record(json!({}), json!({"category": "gardening"}))),
            "category must be one of the following values: cleaning, repair."
        );
    }

    #[test]
    fn test_absent_optional_fields_skip_checks() {
        let rules = RuleSet::new()
            .field("category", Rule::new().trim().one_of(["cleaning"]))
            .field("price", Rule::new().numeric().positive());
        let out = accepted(&rules, &InputRecord::default());
        assert!(out.body.is_empty());
        assert!(out.query.is_empty());
    }

    #[test]
    fn test_array_string_becomes_native_array() {
        let rules = RuleSet::new().field("ids", Rule::new().array());

        let out = accepted(&rules, &record(json!({}), json!({"ids": "[1,2,3]"})));
        assert_eq!(out.body["ids"], json!([1, 2, 3]));

        let out = accepted(&rules, &record(json!({}), json!({"ids": ["a", "b"]})));
        assert_eq!(out.body["ids"], json!(["a", "b"]));

        assert_eq!(
            rejection(&rules, &record(json!({}), json!({"ids": "1,2,3"}))),
            "ids should be an array."
        );
        assert_eq!(
            rejection(&rules, &record(json!({}), json!({"ids": "[1,2"}))),
            "ids should be an array."
        );
    }

    #[test]
    fn test_trim_applies_to_array_elements() {
        let rules = RuleSet::new().field("tags", Rule::new().trim());
        let out = accepted(&rules, &record(json!({}), json!({"tags": [" a ", 2, "b "]})));
        assert_eq!(out.body["tags"], json!(["a", 2, "b"]));
    }

    #[test]
    fn test_json_field_is_parsed() {
        let rules = RuleSet::new().field("meta", Rule::new().json());

        let out = accepted(&rules, &record(json!({}), json!({"meta": "{\"floor\": 2}"})));
        assert_eq!(out.body["meta"], json!({"floor": 2}));

        assert_eq!(
            rejection(&rules, &record(json!({}), json!({"meta": "{floor"}))),
            "meta should be in valid JSON format"
        );
    }

    #[test]
    fn test_numeric_coercion_and_positivity() {
        let rules = RuleSet::new().field("price", Rule::new().trim().numeric().positive());

        let out = accepted(&rules, &record(json!({}), json!({"price": " 42 "})));
        assert_eq!(out.body["price"], json!(42));

        let out = accepted(&rules, &record(json!({}), json!({"price": "12.5"})));
        assert_eq!(out.body["price"], json!(12.5));

        assert_eq!(
            rejection(&rules, &record(json!({}), json!({"price": "-3"}))),
            "price should be a positive number."
        );
    }

    #[test]
    fn test_phone_date_and_time_formats() {
        let rules = RuleSet::new()
            .field("phone", Rule::new().phone())
            .field("day", Rule::new().date())
            .field("at", Rule::new().time());

        let ok = record(
            json!({}),
            json!({"phone": "9876543210", "day": "29-02-2023", "at": "23:59:59"}),
        );
        assert!(validate(&rules, &ok).is_accepted());

        let loose_calendar = record(json!({}), json!({"day": "31-02-2024"}));
        assert!(validate(&rules, &loose_calendar).is_accepted());

        assert_eq!(
            rejection(&rules, &record(json!({}), json!({"phone": "12345"}))),
            "Please enter valid phone number."
        );
        assert_eq!(
            rejection(&rules, &record(json!({}), json!({"day": "2023-02-28"}))),
            "day must be in the format DD-MM-YYYY"
        );
        assert_eq!(
            rejection(&rules, &record(json!({}), json!({"at": "7:00:00"}))),
            "at must be a valid 24-hour time in the format HH:MM:SS"
        );
    }

    #[test]
    fn test_file_presence_type_size_and_extension() {
        let rules = RuleSet::new().field(
            "avatar",
            Rule::new()
                .file_required()
                .file_types(["image/png", "image/jpeg"])
                .max_file_size(1_048_576)
                .file_extensions([".png", "JPG"]),
        );

        assert_eq!(
            rejection(&rules, &InputRecord::default()),
            "avatar is required."
        );

        let wrong_field = InputRecord::default().with_files(vec![png("photo", "a.png", 10)]);
        assert_eq!(rejection(&rules, &wrong_field), "avatar is required.");

        let pdf = InputRecord::default().with_files(vec![FileAttachment::new(
            "avatar",
            "application/pdf",
            "cv.pdf",
            Bytes::from_static(b"%PDF"),
        )]);
        assert_eq!(rejection(&rules, &pdf), "avatar must be a valid file.");

        let big = InputRecord::default().with_files(vec![png("avatar", "a.png", 2_000_000)]);
        let message = rejection(&rules, &big);
        assert!(message.contains("2 MB"), "unexpected message: {}", message);
        assert!(message.starts_with("avatar must be smaller than 1 MB"));

        let misnamed = InputRecord::default().with_files(vec![png("avatar", "a.gif", 10)]);
        assert_eq!(
            rejection(&rules, &misnamed),
            "avatar must have one of the following extensions: .png, JPG."
        );

        let upper = InputRecord::default().with_files(vec![png("avatar", "Photo.PNG", 10)]);
        assert!(validate(&rules, &upper).is_accepted());
    }

    #[test]
    fn test_query_wins_and_both_locations_are_written() {
        let rules = RuleSet::new().field("name", Rule::new().trim());
        let input = record(json!({"name": "  from query "}), json!({"name": " from body "}));

        let out = accepted(&rules, &input);
        assert_eq!(out.query["name"], "from query");
        assert_eq!(out.body["name"], "from query");
    }

    #[test]
    fn test_falsy_locations_are_not_written_back() {
        let rules = RuleSet::new().field("name", Rule::new().trim());
        let input = record(json!({"name": ""}), json!({"name": " Asha "}));

        let out = accepted(&rules, &input);
        assert_eq!(out.query["name"], "");
        assert_eq!(out.body["name"], "Asha");

        let rules = RuleSet::new().field("ids", Rule::new().array());
        let out = accepted(&rules, &record(json!({}), json!({"ids": []})));
        assert_eq!(out.body["ids"], json!([]));
    }

    #[test]
    fn test_unruled_fields_and_input_are_untouched() {
        let rules = RuleSet::new().field("title", Rule::new().trim());
        let input = record(json!({"page": " 2 "}), json!({"title": " Deep clean ", "notes": " x "}));

        let out = accepted(&rules, &input);
        assert_eq!(out.body["title"], "Deep clean");
        assert_eq!(out.body["notes"], " x ");
        assert_eq!(out.query["page"], " 2 ");
        assert_eq!(input.body["title"], " Deep clean ");
    }

    #[test]
    fn test_revalidation_is_idempotent() {
        let rules = RuleSet::new()
            .field("title", Rule::new().trim().required())
            .field("price", Rule::new().trim().numeric())
            .field("ids", Rule::new().array())
            .field("meta", Rule::new().json());
        let input = record(
            json!({"price": " 10 "}),
            json!({"title": " Clean ", "ids": "[1]", "meta": "{\"a\":1}"}),
        );

        let once = accepted(&rules, &input);
        let twice = accepted(&rules, &once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_legacy_class_and_section_fields() {
        let rules = RuleSet::new()
            .field("class_id", Rule::new().required().numeric())
            .field("section_id", Rule::new().required().numeric());

        assert_eq!(
            rejection(&rules, &InputRecord::default()),
            "Please select classId"
        );
        assert_eq!(
            rejection(&rules, &record(json!({}), json!({"class_id": "3"}))),
            "Please select sectionId"
        );

        let out = accepted(
            &rules,
            &record(json!({}), json!({"class_id": "3", "section_id": "12"})),
        );
        assert_eq!(out.query["class_id"], json!(3));
        assert_eq!(out.query["section_id"], json!(12));
        assert_eq!(out.body["class_id"], json!(3));
    }

    #[test]
    fn test_rule_set_declaration_format() {
        let rules = RuleSet::from_json_str(
            r#"{
                "title": { "isTrim": true, "isRequired": true },
                "price": { "isTrim": true, "isRequired": true, "isNumber": true },
                "category": { "enumValues": ["cleaning", "repair"] },
                "logo": { "isFileRequired": true, "allowedFileSize": 1048576, "allowedFileNames": ["png"] }
            }"#,
        )
        .unwrap();

        let names: Vec<&str> = rules.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["title", "price", "category", "logo"]);
        assert_eq!(rules.len(), 4);
        assert!(!rules.is_empty());
        assert_eq!(rules.get("price"), Some(&Rule::new().trim().required().numeric()));
        assert_eq!(
            rules.get("logo").and_then(|r| r.max_file_size),
            Some(1_048_576)
        );

        assert!(RuleSet::from_json_str(r#"{"a": {"isRequird": true}}"#).is_err());
        assert!(RuleSet::from_json_str(r#"{"a": {}, "a": {"isTrim": true}}"#).is_err());
    }

    // ========================================================================
    // Route layer
    // ========================================================================

    static ECHO_RULES: Lazy<RuleSet> = Lazy::new(|| {
        RuleSet::new()
            .field("title", Rule::new().trim().required())
            .field("price", Rule::new().trim().numeric())
            .field("tags", Rule::new().trim())
            .field("logo", Rule::new().max_file_size(1024))
    });

    async fn echo(params: ValidatedParams) -> Json<Value> {
        let files: Vec<Value> = params
            .files
            .iter()
            .map(|f| json!({"field": f.field_name, "name": f.file_name, "type": f.content_type, "size": f.size}))
            .collect();
        Json(json!({"query": params.query, "body": params.body, "files": files}))
    }

    fn echo_app() -> Router {
        Router::new().route(
            "/echo",
            post(echo).layer(from_fn_with_state(&*ECHO_RULES, validate_params)),
        )
    }

    async fn call(request: Request<Body>) -> (StatusCode, Value) {
        let response = echo_app().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_layer_rejects_with_failed_shape() {
        let request = Request::builder()
            .method("POST")
            .uri("/echo")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"price": "12"}"#))
            .unwrap();

        let (status, body) = call(request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            json!({"status": "failed", "code": 400, "message": "title is required"})
        );
    }

    #[tokio::test]
    async fn test_layer_normalizes_json_body() {
        let request = Request::builder()
            .method("POST")
            .uri("/echo?tags=a%20&tags=%20b")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"title": "  Deep clean ", "price": " 40 "}"#))
            .unwrap();

        let (status, body) = call(request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["body"], json!({"title": "Deep clean", "price": 40}));
        assert_eq!(body["query"]["tags"], json!(["a", "b"]));
    }

    #[tokio::test]
    async fn test_layer_reads_form_bodies() {
        let request = Request::builder()
            .method("POST")
            .uri("/echo")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("title=+Haircut+&price=15"))
            .unwrap();

        let (status, body) = call(request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["body"]["title"], "Haircut");
        assert_eq!(body["body"]["price"], json!(15));
    }

    fn multipart_request(file_size: usize) -> Request<Body> {
        let boundary = "XBOUNDARYX";
        let mut payload = Vec::new();
        payload.extend_from_slice(
            format!(
                "--{b}\r\nContent-Disposition: form-data; name=\"title\"\r\n\r\nLogo shoot\r\n\
                 --{b}\r\nContent-Disposition: form-data; name=\"logo\"; filename=\"logo.png\"\r\n\
                 Content-Type: image/png\r\n\r\n",
                b = boundary
            )
            .as_bytes(),
        );
        payload.extend(std::iter::repeat(b'x').take(file_size));
        payload.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());

        Request::builder()
            .method("POST")
            .uri("/echo")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", boundary),
            )
            .body(Body::from(payload))
            .unwrap()
    }

    #[tokio::test]
    async fn test_layer_collects_multipart_files() {
        let (status, body) = call(multipart_request(100)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["body"]["title"], "Logo shoot");
        assert_eq!(
            body["files"],
            json!([{"field": "logo", "name": "logo.png", "type": "image/png", "size": 100}])
        );
    }

    #[tokio::test]
    async fn test_layer_rejects_oversized_file() {
        let (status, body) = call(multipart_request(4096)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"]
            .as_str()
            .unwrap()
            .starts_with("logo must be smaller than"));
    }

    #[tokio::test]
    async fn test_layer_rejects_malformed_json() {
        let request = Request::builder()
            .method("POST")
            .uri("/echo")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();

        let (status, body) = call(request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }
}
