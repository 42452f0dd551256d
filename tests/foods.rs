#![allow(
    clippy::unwrap_used,
    reason = "Do not need additional syntax for setting up tests"
)]

//! Integration tests for the food, meal, and water endpoints.

pub mod common;

use fitbit_client_sdk::ResponseFormat;
use fitbit_client_sdk::types::request::{CreateFoodRequest, LogFoodRequest, LogWaterRequest};
use httpmock::{Method::DELETE, Method::GET, Method::POST, MockServer};
use rust_decimal_macros::dec;
use serde_json::json;

#[tokio::test]
async fn foods_for_date_should_succeed() -> anyhow::Result<()> {
    let server = MockServer::start();
    let client = common::authorized_client(&server);

    let mock = server.mock(|when, then| {
        when.method(GET).path("/1/user/-/foods/log/date/2011-07-10.xml");
        then.status(200).body(
            "<result><summary><calories>1558</calories><water>800</water></summary>\
             <foods/></result>",
        );
    });

    let log = client.foods(common::date(2011, 7, 10)).await?;

    mock.assert();
    assert_eq!(log["summary"]["calories"], "1558");

    Ok(())
}

#[tokio::test]
async fn search_foods_sends_the_query() -> anyhow::Result<()> {
    let server = MockServer::start();
    let client = common::authorized_client(&server);
    client.set_response_format(ResponseFormat::Json);

    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/1/foods/search.json")
            .query_param("query", "banana");
        then.status(200)
            .json_body(json!({"foods": [{"foodId": 10409, "name": "Banana"}]}));
    });

    let results = client.search_foods("banana").await?;

    mock.assert();
    assert_eq!(results["foods"][0]["foodId"], 10409);

    Ok(())
}

#[tokio::test]
async fn food_units_and_detail() -> anyhow::Result<()> {
    let server = MockServer::start();
    let client = common::authorized_client(&server);

    let units = server.mock(|when, then| {
        when.method(GET).path("/1/foods/units.xml");
        then.status(200)
            .body("<result><units><unit><id>147</id><name>gram</name></unit></units></result>");
    });
    let detail = server.mock(|when, then| {
        when.method(GET).path("/1/foods/10409.xml");
        then.status(200)
            .body("<result><food><name>Banana Split</name></food></result>");
    });

    let unit_library = client.food_units().await?;
    let food = client.food("10409").await?;

    units.assert();
    detail.assert();
    assert_eq!(unit_library["units"]["unit"]["name"], "gram");
    assert_eq!(food["food"]["name"], "Banana Split");

    Ok(())
}

#[tokio::test]
async fn log_food_sends_required_parameters() -> anyhow::Result<()> {
    let server = MockServer::start();
    let client = common::authorized_client(&server);

    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/1/user/-/foods/log.xml")
            .body("date=2011-07-10&foodId=10409&mealTypeId=3&unitId=147&amount=2.5");
        then.status(201)
            .body("<result><foodLog><logId>8100</logId></foodLog></result>");
    });

    let request = LogFoodRequest::builder()
        .date(common::date(2011, 7, 10))
        .food_id("10409")
        .meal_type_id("3")
        .unit_id("147")
        .amount(dec!(2.5))
        .build();
    let log = client.log_food(&request).await?;

    mock.assert();
    assert_eq!(log["foodLog"]["logId"], "8100");

    Ok(())
}

#[tokio::test]
async fn create_private_food() -> anyhow::Result<()> {
    let server = MockServer::start();
    let client = common::authorized_client(&server);

    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/1/foods.xml")
            .body(
                "name=Overnight+oats&defaultFoodMeasurementUnitId=91\
                 &defaultServingSize=1&calories=310",
            );
        then.status(201)
            .body("<result><food><foodId>99001</foodId></food></result>");
    });

    let request = CreateFoodRequest::builder()
        .name("Overnight oats")
        .default_food_measurement_unit_id("91")
        .default_serving_size(dec!(1))
        .calories(310)
        .build();
    let food = client.create_food(&request).await?;

    mock.assert();
    assert_eq!(food["food"]["foodId"], "99001");

    Ok(())
}

#[tokio::test]
async fn delete_food_and_favorites() -> anyhow::Result<()> {
    let server = MockServer::start();
    let client = common::authorized_client(&server);

    let delete = server.mock(|when, then| {
        when.method(DELETE).path("/1/user/-/foods/log/8100.xml");
        then.status(204);
    });
    let favorite = server.mock(|when, then| {
        when.method(POST).path("/1/user/-/foods/log/favorite/10409.xml");
        then.status(201)
            .body("<result><food><foodId>10409</foodId></food></result>");
    });
    let unfavorite = server.mock(|when, then| {
        when.method(DELETE).path("/1/user/-/foods/log/favorite/10409.xml");
        then.status(204);
    });

    client.delete_food("8100").await?;
    client.add_favorite_food("10409").await?;
    client.delete_favorite_food("10409").await?;

    delete.assert();
    favorite.assert();
    unfavorite.assert();

    Ok(())
}

#[tokio::test]
async fn meals_should_succeed() -> anyhow::Result<()> {
    let server = MockServer::start();
    let client = common::authorized_client(&server);

    let mock = server.mock(|when, then| {
        when.method(GET).path("/1/user/-/meals.xml");
        then.status(200)
            .body("<result><meals><meal><name>Breakfast</name></meal></meals></result>");
    });

    let meals = client.meals().await?;

    mock.assert();
    assert_eq!(meals["meals"]["meal"]["name"], "Breakfast");

    Ok(())
}

mod water {
    use super::*;

    #[tokio::test]
    async fn water_for_date_should_succeed() -> anyhow::Result<()> {
        let server = MockServer::start();
        let client = common::authorized_client(&server);

        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/1/user/-/foods/log/water/date/2011-07-10.xml");
            then.status(200).body(
                "<result><summary><water>800</water></summary>\
                 <water><waterLog><logId>71</logId><amount>300</amount></waterLog></water></result>",
            );
        });

        let log = client.water(common::date(2011, 7, 10)).await?;

        mock.assert();
        assert_eq!(log["summary"]["water"], "800");

        Ok(())
    }

    // Exact body match: a unit outside the allow-list must not travel.
    #[tokio::test]
    async fn log_water_filters_the_unit() -> anyhow::Result<()> {
        let server = MockServer::start();
        let client = common::authorized_client(&server);

        let with_unit = server.mock(|when, then| {
            when.method(POST)
                .path("/1/user/-/foods/log/water.xml")
                .body("date=2011-07-10&amount=300&unit=ml");
            then.status(201)
                .body("<result><waterLog><logId>71</logId></waterLog></result>");
        });

        let request = LogWaterRequest::builder()
            .date(common::date(2011, 7, 10))
            .amount(dec!(300))
            .unit("ml")
            .build();
        client.log_water(&request).await?;
        with_unit.assert();

        let without_unit = server.mock(|when, then| {
            when.method(POST)
                .path("/1/user/-/foods/log/water.xml")
                .body("date=2011-07-10&amount=300");
            then.status(201)
                .body("<result><waterLog><logId>72</logId></waterLog></result>");
        });

        let request = LogWaterRequest::builder()
            .date(common::date(2011, 7, 10))
            .amount(dec!(300))
            .unit("hogshead")
            .build();
        client.log_water(&request).await?;
        without_unit.assert();

        Ok(())
    }

    #[tokio::test]
    async fn delete_water_expects_no_content() -> anyhow::Result<()> {
        let server = MockServer::start();
        let client = common::authorized_client(&server);

        let mock = server.mock(|when, then| {
            when.method(DELETE).path("/1/user/-/foods/log/water/71.xml");
            then.status(204);
        });

        client.delete_water("71").await?;
        mock.assert();

        Ok(())
    }
}
