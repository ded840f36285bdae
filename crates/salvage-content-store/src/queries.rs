//! GROQ queries sent to the hosted content platform

/// Every category's id and the ids its sub-category references point at
pub const CATEGORY_GRAPH_QUERY: &str = r#"*[_type == "category"]{
  _id,
  "subCategories": subCategories[]._ref
}"#;

/// Categories with post counts, one level of sub-categories expanded
pub const CATEGORIES_QUERY: &str = r#"*[_type == "category"]{
  _id,
  name,
  slug,
  description,
  "postCount": count(*[_type == "blog" && references(^._id)]),
  "subCategories": subCategories[]->{
    _id,
    name,
    slug,
    description,
    "postCount": count(*[_type == "blog" && references(^._id)])
  }
}"#;

/// Job counts, totals and the five most recent jobs
pub const JOBS_DASHBOARD_SUMMARY_QUERY: &str = r#"{
  "totalJobs": count(*[_type == "job"]),
  "completedJobs": count(*[_type == "job" && status == "completed"]),
  "inProgressJobs": count(*[_type == "job" && status == "in-progress"]),
  "cancelledJobs": count(*[_type == "job" && status == "cancelled"]),
  "allJobs": *[_type == "job"]{
    totalWeight,
    totalPurchasePrice
  },
  "recentJobs": *[_type == "job"] | order(_createdAt desc)[0...5]{
    _id,
    name,
    jobId,
    status,
    totalWeight,
    totalPurchasePrice,
    dateCreated,
    "customerCount": count(customer)
  }
}"#;

/// Every job, newest first
pub const JOBS_LIST_QUERY: &str = r#"*[_type == "job"] | order(_createdAt desc){
  _id,
  name,
  jobId,
  description,
  status,
  totalWeight,
  totalPurchasePrice,
  dateCreated,
  dateCompleted,
  "customers": customer[]->{
    _id,
    name,
    companyName,
    email,
    phone
  },
  "metalCount": count(metals),
  "processCount": count(processes),
  "imageCount": count(images)
}"#;

/// One job by id, references expanded. Takes `$jobId`.
pub const JOB_DETAIL_QUERY: &str = r#"*[_type == "job" && _id == $jobId][0]{
  _id,
  name,
  jobId,
  description,
  status,
  totalWeight,
  totalPurchasePrice,
  dateCreated,
  dateCompleted,
  "customers": customer[]->{
    _id,
    name,
    companyName,
    email,
    phone,
    address,
    notes
  },
  "metals": metals[]{
    _key,
    weight,
    purchasePrice,
    notes,
    "metal": metal->{
      _id,
      name,
      type,
      currentPricePerPound,
      unit
    }
  },
  "processes": processes[]->{
    _id,
    name,
    description
  },
  "relatedBlogPosts": relatedBlogPosts[]->{
    _id,
    title,
    "slug": slug.current
  }
}"#;

/// Metal catalogue and the metal entries of every job
pub const METAL_ANALYTICS_QUERY: &str = r#"{
  "metalTypes": *[_type == "metals"]{
    _id,
    name,
    type,
    currentPricePerPound,
    unit,
    isActive
  },
  "metalUsage": *[_type == "job" && defined(metals)]{
    "metals": metals[]{
      "metal": metal->{
        _id,
        name,
        type
      },
      weight,
      purchasePrice
    }
  }
}"#;

/// Customer counts and the ten customers with the most jobs
pub const CUSTOMER_ANALYTICS_QUERY: &str = r#"{
  "totalCustomers": count(*[_type == "customer"]),
  "customersWithJobs": count(*[_type == "customer" && count(*[_type == "job" && references(^._id)]) > 0]),
  "topCustomers": *[_type == "customer"]{
    _id,
    name,
    companyName,
    email,
    "jobCount": count(*[_type == "job" && references(^._id)]),
    "jobs": *[_type == "job" && references(^._id)] | order(dateCreated desc){
      totalPurchasePrice,
      dateCreated
    }
  } | order(jobCount desc)[0...10]
}"#;

/// Cheapest query that proves the dataset answers
pub const PING_QUERY: &str = "count(*[_type == \"category\"][0...1])";
