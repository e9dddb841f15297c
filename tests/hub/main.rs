mod mock;

use iothub_lite::network::application::hub::{Config, Error, HubClient, Status};
use mock::{MockClock, MockDelay, MockModem};
use rand::Rng;

const CONNECTION_STRING: &str = "HostName=foo.example.net;DeviceId=dev1;SharedAccessKey=a2V5MTI=";
const START: u64 = 1_700_000_000;
const PUBLISH_PATH: &str = "/devices/dev1/messages/events?api-version=2016-11-14";
const PULL_PATH: &str = "/devices/dev1/messages/devicebound?api-version=2016-11-14";

fn client<'c>(
    modem: &MockModem,
    clock: &'c MockClock,
    delay: &MockDelay,
) -> HubClient<MockModem, &'c MockClock, MockDelay> {
    HubClient::new(
        modem.clone(),
        clock,
        delay.clone(),
        CONNECTION_STRING,
        Config::default(),
    )
    .unwrap()
}

fn publish_head(token: &str, content_length: usize) -> String {
    format!(
        "POST {PUBLISH_PATH} HTTP/1.1\r\n\
         Host: foo.example.net\r\n\
         Authorization: SharedAccessSignature {token}\r\n\
         Content-Type: application/atom+xml;type=entry;charset=utf-8\r\n\
         Content-Length: {content_length}\r\n\r\n"
    )
}

#[test]
fn test_publish_wire_format() {
    let modem = MockModem::new();
    let clock = MockClock::at(START);
    let delay = MockDelay::default();
    let mut hub = client(&modem, &clock, &delay);
    modem.reply(b"HTTP/1.1 204 No Content\r\nContent-Length: 0\r\n\r\n");

    let payload = br#"{"temperature":21.5,"humidity":40}"#;
    let status = hub.publish(payload).unwrap();
    assert_eq!(status.as_str(), "204");
    assert!(status.is_success());

    let token = hub.ensure_valid_token().unwrap().as_str().to_string();
    assert!(token.starts_with("sr=foo%2eexample%2enet%2fdevices%2fdev1&sig="));
    assert!(token.ends_with("&se=1700000300"));

    let state = modem.state.borrow();
    let expected = publish_head(&token, payload.len()) + std::str::from_utf8(payload).unwrap();
    assert_eq!(state.written_text(), expected);
    assert!(state.writes.iter().all(|w| w.len() <= 200));
    assert_eq!(state.remotes, vec!["foo.example.net:443"]);
    assert_eq!(*delay.waits.borrow(), vec![1000, 50]);
}

#[test]
fn test_publish_large_payload_in_segments() {
    let modem = MockModem::new();
    let clock = MockClock::at(START);
    let delay = MockDelay::default();
    let mut hub = client(&modem, &clock, &delay);
    modem.reply(b"HTTP/1.1 204 No Content\r\n\r\n");

    let payload = [b'x'; 450];
    hub.publish(&payload).unwrap();

    let state = modem.state.borrow();
    let body_writes = &state.writes[state.writes.len() - 3..];
    let lengths: Vec<usize> = body_writes.iter().map(Vec::len).collect();
    assert_eq!(lengths, vec![200, 200, 50]);
    assert_eq!(body_writes.concat(), payload.to_vec());
}

#[test]
fn test_streaming_publish() {
    let modem = MockModem::new();
    let clock = MockClock::at(START);
    let delay = MockDelay::default();
    let mut hub = client(&modem, &clock, &delay);
    modem.reply(b"HTTP/1.1 204 No Content\r\n\r\n");

    hub.publish_begin(25).unwrap();
    hub.publish_data(b"{\"reading\":").unwrap();
    hub.publish_data(b"[1,2,3,4,5,6]}").unwrap();
    assert_eq!(hub.publish_end().code(), Some(204));

    let token = hub.ensure_valid_token().unwrap().as_str().to_string();
    let expected = publish_head(&token, 25) + "{\"reading\":[1,2,3,4,5,6]}";
    assert_eq!(modem.state.borrow().written_text(), expected);
}

#[test]
fn test_route_header() {
    let modem = MockModem::new();
    let clock = MockClock::at(START);
    let config = Config {
        route_id: Some("telemetry"),
        ..Config::default()
    };
    let mut hub = HubClient::new(
        modem.clone(),
        &clock,
        MockDelay::default(),
        CONNECTION_STRING,
        config,
    )
    .unwrap();

    hub.publish(b"{}").unwrap();
    let text = modem.state.borrow().written_text();
    assert!(text.contains(
        "charset=utf-8\r\niothub-app-route-id: telemetry\r\nContent-Length: 2\r\n\r\n{}"
    ));
}

#[test]
fn test_route_id_too_long() {
    let long = "r".repeat(65);
    let config = Config {
        route_id: Some(&long),
        ..Config::default()
    };
    let clock = MockClock::at(START);
    let result = HubClient::new(
        MockModem::new(),
        &clock,
        MockDelay::default(),
        CONNECTION_STRING,
        config,
    );
    assert_eq!(result.unwrap_err(), Error::BufferOverflow);
}

#[test]
fn test_custom_port() {
    let modem = MockModem::new();
    let clock = MockClock::at(START);
    let config = Config {
        port: 8080,
        settle_delay_ms: 0,
        ..Config::default()
    };
    let mut hub = HubClient::new(
        modem.clone(),
        &clock,
        MockDelay::default(),
        CONNECTION_STRING,
        config,
    )
    .unwrap();

    hub.publish(b"1").unwrap();
    assert_eq!(modem.state.borrow().remotes, vec!["foo.example.net:8080"]);
}

#[test]
fn test_connection_is_reused() {
    let modem = MockModem::new();
    let clock = MockClock::at(START);
    let delay = MockDelay::default();
    let mut hub = client(&modem, &clock, &delay);
    modem.reply(b"HTTP/1.1 204 No Content\r\n\r\n");
    modem.reply(b"HTTP/1.1 204 No Content\r\n\r\n");

    hub.publish(b"one").unwrap();
    hub.publish(b"two").unwrap();

    assert_eq!(modem.connects(), 1);
    let waits = delay.waits.borrow();
    assert_eq!(waits.iter().filter(|&&ms| ms == 1000).count(), 1);
    assert!(hub.is_connected());
}

#[test]
fn test_token_reused_then_renewed() {
    let modem = MockModem::new();
    let clock = MockClock::at(START);
    let delay = MockDelay::default();
    let mut hub = client(&modem, &clock, &delay);

    hub.publish(b"a").unwrap();
    clock.advance(299);
    hub.publish(b"b").unwrap();
    clock.advance(2);
    hub.publish(b"c").unwrap();

    let text = modem.state.borrow().written_text();
    assert_eq!(text.matches("&se=1700000300\r\n").count(), 2);
    assert_eq!(text.matches("&se=1700000601\r\n").count(), 1);
}

#[test]
fn test_clock_not_set() {
    let modem = MockModem::new();
    let clock = MockClock::unset();
    let delay = MockDelay::default();
    let mut hub = client(&modem, &clock, &delay);

    assert_eq!(hub.publish(b"data"), Err(Error::ClockNotSet));
    assert_eq!(hub.pull_device_bound_message(), Err(Error::ClockNotSet));
    assert_eq!(Error::ClockNotSet.as_str(), "Time not set");

    assert_eq!(modem.connects(), 0);
    assert!(modem.state.borrow().writes.is_empty());

    clock.set.set(true);
    clock.now.set(START);
    hub.publish(b"data").unwrap();
    assert_eq!(modem.connects(), 1);
}

#[test]
fn test_invalid_key_does_not_connect() {
    let modem = MockModem::new();
    let clock = MockClock::at(START);
    let mut hub = HubClient::new(
        modem.clone(),
        &clock,
        MockDelay::default(),
        "HostName=foo.example.net;DeviceId=dev1;SharedAccessKey=@@@",
        Config::default(),
    )
    .unwrap();

    assert_eq!(hub.publish(b"data"), Err(Error::InvalidKey));
    assert_eq!(modem.connects(), 0);
}

#[test]
fn test_connect_failure_then_recovery() {
    let modem = MockModem::new();
    let clock = MockClock::at(START);
    let delay = MockDelay::default();
    let mut hub = client(&modem, &clock, &delay);
    modem.state.borrow_mut().refuse_connect = true;

    assert_eq!(hub.publish(b"data"), Err(Error::Connect));
    assert!(!hub.is_connected());
    assert!(delay.waits.borrow().is_empty());

    modem.state.borrow_mut().refuse_connect = false;
    modem.reply(b"HTTP/1.1 204 No Content\r\n\r\n");
    assert_eq!(hub.publish(b"data").unwrap().as_str(), "204");
}

#[test]
fn test_write_failure_drops_connection() {
    let modem = MockModem::new();
    let clock = MockClock::at(START);
    let delay = MockDelay::default();
    let mut hub = client(&modem, &clock, &delay);
    modem.state.borrow_mut().fail_write_at = Some(1);

    assert_eq!(hub.publish(b"data"), Err(Error::Write));
    assert!(!hub.is_connected());
    assert_eq!(modem.state.borrow().closes, 1);
    assert_eq!(modem.state.borrow().writes.len(), 1);

    modem.reply(b"HTTP/1.1 204 No Content\r\n\r\n");
    hub.publish(b"data").unwrap();
    assert_eq!(modem.connects(), 2);
}

#[test]
fn test_publish_without_reply_is_unknown() {
    let modem = MockModem::new();
    let clock = MockClock::at(START);
    let delay = MockDelay::default();
    let mut hub = client(&modem, &clock, &delay);

    let status = hub.publish(b"data").unwrap();
    assert_eq!(status, Status::Unknown);
    assert_eq!(status.as_str(), "unknown");
    assert_eq!(modem.state.borrow().read_calls, 10);

    let mut expected = vec![1000];
    expected.extend([50; 10]);
    assert_eq!(*delay.waits.borrow(), expected);
    assert!(!hub.is_connected());
    assert_eq!(modem.state.borrow().closes, 1);
}

#[test]
fn test_late_reply_is_not_read_as_next_status() {
    let modem = MockModem::new();
    let clock = MockClock::at(START);
    let delay = MockDelay::default();
    let mut hub = client(&modem, &clock, &delay);
    let unauthorized = b"HTTP/1.1 401 Unauthorized\r\n\r\n".to_vec();
    modem.state.borrow_mut().late_reply = Some((10, unauthorized));

    assert_eq!(hub.publish(b"one").unwrap(), Status::Unknown);
    assert!(!hub.is_connected());

    modem.reply(b"HTTP/1.1 204 No Content\r\n\r\n");
    assert_eq!(hub.publish(b"two").unwrap().code(), Some(204));
    assert_eq!(modem.connects(), 2);
}

#[test]
fn test_missing_key_does_not_connect() {
    let modem = MockModem::new();
    let clock = MockClock::at(START);
    let mut hub = HubClient::new(
        modem.clone(),
        &clock,
        MockDelay::default(),
        "HostName=foo.example.net;DeviceId=dev1",
        Config::default(),
    )
    .unwrap();

    assert_eq!(hub.publish(b"data"), Err(Error::InvalidKey));
    assert_eq!(hub.pull_device_bound_message(), Err(Error::InvalidKey));
    assert_eq!(modem.connects(), 0);
}

#[test]
fn test_pull_device_bound_message() {
    let modem = MockModem::new();
    let clock = MockClock::at(START);
    let delay = MockDelay::default();
    let mut hub = client(&modem, &clock, &delay);
    let reply = "HTTP/1.1 200 OK\r\nContent-Length: 6\r\n\r\nreboot";
    modem.reply(reply.as_bytes());

    let message = hub.pull_device_bound_message().unwrap();
    assert_eq!(message.status.code(), Some(200));
    assert_eq!(message.raw, reply);

    let token = hub.ensure_valid_token().unwrap().as_str().to_string();
    let expected = format!(
        "GET {PULL_PATH} HTTP/1.1\r\n\
         Host: foo.example.net\r\n\
         Authorization: SharedAccessSignature {token}\r\n\
         Connection: close\r\n\r\n"
    );
    assert_eq!(modem.state.borrow().written_text(), expected);

    assert!(!hub.is_connected());
    assert_eq!(modem.state.borrow().closes, 1);

    hub.pull_device_bound_message().unwrap();
    assert_eq!(modem.connects(), 2);
}

#[test]
fn test_pull_without_message() {
    let modem = MockModem::new();
    let clock = MockClock::at(START);
    let delay = MockDelay::default();
    let mut hub = client(&modem, &clock, &delay);

    let message = hub.pull_device_bound_message().unwrap();
    assert_eq!(message.status, Status::Unknown);
    assert!(message.raw.is_empty());
}

#[test]
fn test_pull_truncates_long_reply() {
    let modem = MockModem::new();
    let clock = MockClock::at(START);
    let delay = MockDelay::default();
    let mut hub = client(&modem, &clock, &delay);
    let mut reply = b"HTTP/1.1 200 OK\r\n\r\n".to_vec();
    reply.resize(900, b'z');
    modem.reply(&reply);

    let message = hub.pull_device_bound_message().unwrap();
    assert_eq!(message.raw.len(), 512);
    assert_eq!(message.status.code(), Some(200));
}

#[test]
fn test_random_payloads_arrive_intact() {
    let mut rng = rand::thread_rng();
    let modem = MockModem::new();
    let clock = MockClock::at(START);
    let delay = MockDelay::default();
    let mut hub = client(&modem, &clock, &delay);

    for _ in 0..20 {
        let len = rng.gen_range(1..2000);
        let mut payload = vec![0u8; len];
        rng.fill(&mut payload[..]);

        hub.publish_begin(len).unwrap();
        let before = modem.state.borrow().writes.len();
        hub.publish_data(&payload).unwrap();
        modem.reply(b"HTTP/1.1 204 No Content\r\n\r\n");
        assert!(hub.publish_end().is_success());

        let state = modem.state.borrow();
        let body = &state.writes[before..];
        assert_eq!(body.len(), len.div_ceil(200));
        assert!(body.iter().all(|w| w.len() <= 200));
        assert_eq!(body.concat(), payload);
    }
    assert_eq!(modem.connects(), 1);
}

#[test]
fn test_credentials_exposed() {
    let modem = MockModem::new();
    let clock = MockClock::at(START);
    let hub = client(&modem, &clock, &MockDelay::default());

    assert_eq!(hub.credentials().host(), "foo.example.net");
    assert_eq!(hub.credentials().device_id(), "dev1");
    assert_eq!(hub.endpoints().publish(), PUBLISH_PATH);
    assert_eq!(hub.endpoints().device_bound(), PULL_PATH);
    assert_eq!(hub.connector().connects(), 0);
}
