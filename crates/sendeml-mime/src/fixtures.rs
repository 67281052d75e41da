//! Shared test messages.

fn crlf(text: &str) -> Vec<u8> {
    text.replace('\n', "\r\n").into_bytes()
}

const SIMPLE_MAIL: &str = "From: a001 <a001@ah62.example.jp>
Subject: test
To: a002@ah62.example.jp
Message-ID: <b0e564a5-4f70-761a-e103-70119d1bcb32@ah62.example.jp>
Date: Sun, 26 Jul 2020 22:01:37 +0900
User-Agent: Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:78.0) Gecko/20100101
 Thunderbird/78.0.1
MIME-Version: 1.0
Content-Type: text/plain; charset=utf-8; format=flowed
Content-Transfer-Encoding: 7bit
Content-Language: en-US

test";

/// A message whose Message-ID is line 3 and Date is line 4.
pub fn simple_mail() -> Vec<u8> {
    crlf(SIMPLE_MAIL)
}

/// The simple message with its blank line removed.
pub fn invalid_mail() -> Vec<u8> {
    crlf(&SIMPLE_MAIL.replace("\n\n", "\n"))
}

/// A message whose Message-ID and Date values are folded.
pub fn folded_mail() -> Vec<u8> {
    crlf("From: a001 <a001@ah62.example.jp>
Subject: test
To: a002@ah62.example.jp
Message-ID:
 <b0e564a5-4f70-761a-e103-70119d1bcb32@ah62.example.jp>
Date:
 Sun, 26 Jul 2020
 22:01:37 +0900
User-Agent: Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:78.0) Gecko/20100101
 Thunderbird/78.0.1
MIME-Version: 1.0
Content-Type: text/plain; charset=utf-8; format=flowed
Content-Transfer-Encoding: 7bit
Content-Language: en-US

test")
}

/// A header block whose last field is a folded Date.
pub fn folded_end_date_header() -> Vec<u8> {
    crlf("From: a001 <a001@ah62.example.jp>
Subject: test
To: a002@ah62.example.jp
Message-ID:
 <b0e564a5-4f70-761a-e103-70119d1bcb32@ah62.example.jp>
User-Agent: Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:78.0) Gecko/20100101
 Thunderbird/78.0.1
MIME-Version: 1.0
Content-Type: text/plain; charset=utf-8; format=flowed
Content-Transfer-Encoding: 7bit
Content-Language: en-US
Date:
 Sun, 26 Jul 2020
 22:01:37 +0900
")
}

/// A header block whose last field is a folded Message-ID.
pub fn folded_end_message_id_header() -> Vec<u8> {
    crlf("From: a001 <a001@ah62.example.jp>
Subject: test
To: a002@ah62.example.jp
User-Agent: Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:78.0) Gecko/20100101
 Thunderbird/78.0.1
MIME-Version: 1.0
Content-Type: text/plain; charset=utf-8; format=flowed
Content-Transfer-Encoding: 7bit
Content-Language: en-US
Date:
 Sun, 26 Jul 2020
 22:01:37 +0900
Message-ID:
 <b0e564a5-4f70-761a-e103-70119d1bcb32@ah62.example.jp>
")
}

/// Returns the whole field starting with `name`, continuation lines included.
pub fn field_block(buf: &[u8], name: &str) -> Option<String> {
    let text = String::from_utf8_lossy(buf);
    let mut block = String::new();
    for line in text.split_inclusive('\n') {
        if block.is_empty() {
            if line.starts_with(name) {
                block.push_str(line);
            }
        } else if line.starts_with([' ', '\t']) {
            block.push_str(line);
        } else {
            break;
        }
    }
    (!block.is_empty()).then_some(block)
}
